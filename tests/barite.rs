// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Integration tests for barite precipitation

use float_cmp::assert_approx_eq;
use precipitation::{
    registry::ScalarField, CellFields, CellState, Config, ReactionEngine, AVOGADRO_CONSTANT,
    BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, GAS_CONSTANT, SMALL, VACUUM_ELECTRIC_PERMITTIVITY,
};
use std::f64::consts::PI;

const WATER: f64 = 0.01801528;

/// Saturation rate of barite computed by hand with the Pitzer model without virial terms
fn saturation_rate_by_hand(cell: &CellState) -> f64 {
    let total = 1.0 / (WATER / (1.0 - cell.y_etc1 - cell.y_etc2) + SMALL);
    let (m_a, m_b) = (cell.y_a * total, cell.y_b * total);
    let mean = (m_a * m_b + SMALL).sqrt();
    let ionic_strength = 0.5 * (cell.y_etc1 * total + 4.0 * cell.y_etc2 * total);
    let bjerrum_length = ELEMENTARY_CHARGE.powi(2)
        / (4.0 * PI * VACUUM_ELECTRIC_PERMITTIVITY * 78.4 * BOLTZMANN_CONSTANT * cell.temperature);
    let a = (2.0 * PI * AVOGADRO_CONSTANT * 997.0).sqrt() * bjerrum_length.powf(1.5);
    let sqrt_i = ionic_strength.sqrt();
    let f_gamma = -a / 3.0 * (sqrt_i / (1.0 + 1.2 * sqrt_i) + 2.0 / 1.2 * (1.0 + 1.2 * sqrt_i).ln());
    let gamma = (4.0 * f_gamma).exp();
    let log_k = -9.87 + 6.35 * 4186.8 / GAS_CONSTANT * (1.0 / 298.15 - 1.0 / cell.temperature);
    (mean * gamma).powi(2) / 10f64.powf(log_k)
}

#[test]
fn input_file_is_barite() {
    let config = Config::from_file("tests/files/barite.yaml").unwrap();
    assert_eq!(config, Config::barite());
}

#[test]
fn saturation_index_by_hand() {
    let engine = Config::from_file("tests/files/barite.yaml")
        .unwrap()
        .engine()
        .unwrap();
    for cell in [
        CellState::new(298.15, 1e-5, 2e-5, 1e-3, 1e-4),
        CellState::new(320.0, 3e-6, 1e-6, 5e-3, 0.0),
        CellState::new(280.0, 1e-4, 1e-4, 0.0, 2e-3),
    ] {
        let expected = saturation_rate_by_hand(&cell);
        assert_approx_eq!(
            f64,
            engine.saturation_rate(&cell) / expected,
            1.0,
            epsilon = 1e-10
        );
        assert_approx_eq!(
            f64,
            engine.saturation_index(&cell),
            expected.log10(),
            epsilon = 1e-10
        );
    }
}

#[test]
fn saturation_index_without_background_ions() {
    let engine = Config::barite().engine().unwrap();
    let cell = CellState::new(298.15, 1e-5, 1e-5, 0.0, 0.0);
    // activity is unity below the minimum ionic strength
    assert_eq!(engine.activity_coefficient(&cell), 1.0);
    let total = 1.0 / (WATER + SMALL);
    let mean = ((1e-5 * total).powi(2) + SMALL).sqrt();
    let expected = (mean.powi(2) / 10f64.powf(-9.87)).log10();
    assert_approx_eq!(
        f64,
        engine.saturation_index(&cell),
        expected,
        epsilon = 1e-12
    );
    assert_approx_eq!(
        f64,
        engine.saturation_index(&cell),
        saturation_rate_by_hand(&cell).log10(),
        epsilon = 1e-12
    );
}

#[test]
fn ionic_strength_is_bounded() {
    let engine = ReactionEngine::barite();
    for (y_etc1, y_etc2) in [(0.0, 0.0), (1e-30, 0.0), (0.0, 1e-12), (0.1, 0.2)] {
        let cell = CellState::new(298.15, 1e-5, 1e-5, y_etc1, y_etc2);
        let ionic_strength = engine.ionic_strength(&cell);
        assert!(ionic_strength >= 1e-18);
        assert!(!ionic_strength.is_nan());
    }
}

#[test]
fn wall_concentration_is_clamped() {
    let engine = ReactionEngine::barite();
    for y_a in [0.0, 1e-9, 1e-6, 1e-5, 1e-3] {
        for y_etc1 in [0.0, 1e-3, 1e-2] {
            let cell = CellState::new(298.15, y_a, 1e-5, y_etc1, 0.0);
            let total = engine.molalities(&cell).total;
            assert!(engine.wall_concentration_a(&cell) <= total * y_a);
            assert!(engine.wall_concentration_b(&cell) <= total * 1e-5);
        }
    }
}

#[test]
fn depleted_saturation_rate() {
    let engine = ReactionEngine::barite();
    let cell = CellState::new(298.15, 0.0, 1e-3, 1e-3, 0.0);
    assert_eq!(engine.saturation_rate(&cell), SMALL);
}

#[test]
fn temperature_increases_solubility() {
    let engine = ReactionEngine::barite();
    let cold = CellState::new(280.0, 1e-5, 1e-5, 1e-3, 0.0);
    let hot = CellState { temperature: 350.0, ..cold };
    assert!(engine.saturation_index(&hot) < engine.saturation_index(&cold));
}

#[test]
fn element_wise_over_cell_file() {
    let engine = Config::barite().engine().unwrap();
    let temperature = [298.15, 310.0, 340.0, 298.15];
    let y_a = [1e-5, 2e-6, 1e-4, 0.0];
    let y_b = [1e-5, 5e-6, 2e-5, 1e-5];
    let y_etc1 = [0.0, 1e-3, 5e-3, 1e-3];
    let y_etc2 = [0.0, 0.0, 1e-3, 0.0];
    let cells = CellFields::new(&temperature, &y_a, &y_b, &y_etc1, &y_etc2).unwrap();

    let mut si = [0.0; 4];
    engine.saturation_indices(&mut si, &cells).unwrap();
    let mut nucleation = [0.0; 4];
    engine
        .nucleation_rates(&mut nucleation, &cells, ReactionEngine::saturation_index)
        .unwrap();
    let mut wall = [0.0; 4];
    engine
        .wall_reaction_rates_mole_fraction(&mut wall, &cells, &si, &[0.0; 4])
        .unwrap();

    for (i, cell) in cells.iter().enumerate() {
        assert_eq!(si[i], engine.saturation_index(&cell));
        assert_eq!(
            nucleation[i],
            engine.nucleation_rate(&cell, ReactionEngine::saturation_index)
        );
        assert!(wall[i] >= 0.0);
    }
    // no A, no deposition
    assert_eq!(wall[3], 0.0);
}

#[test]
fn command_line() {
    let output = std::env::temp_dir().join("precipitation_command_line.yaml");
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_precipitation"))
        .args(["-o", output.to_str().unwrap(), "eval"])
        .args(["-i", "tests/files/barite.yaml", "-c", "tests/files/cells.yaml"])
        .args(["-f", "Saturation Index", "-f", "Wall Deposition (Molality)"])
        .status()
        .unwrap();
    assert!(status.success());

    let yaml = std::fs::read_to_string(&output).unwrap();
    let results: std::collections::BTreeMap<String, Vec<f64>> =
        serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(results.len(), 2);
    let si = &results[ScalarField::SaturationIndex.name()];
    assert_eq!(si.len(), 4);
    let cell = CellState::new(310.0, 2e-6, 5e-6, 1e-3, 0.0);
    assert_approx_eq!(
        f64,
        si[1],
        ReactionEngine::barite().saturation_index(&cell),
        epsilon = 1e-12
    );
    let wall = &results[ScalarField::WallReactionRateMolality.name()];
    // below saturation and far from the wall
    assert_eq!(wall[1], 0.0);
    assert!(wall[0] > 0.0);
    std::fs::remove_file(output).unwrap();
}

#[test]
fn command_line_rejects_unknown_function() {
    let output = std::env::temp_dir().join("precipitation_unknown_function.yaml");
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_precipitation"))
        .args(["-o", output.to_str().unwrap(), "eval"])
        .args(["-i", "tests/files/barite.yaml", "-c", "tests/files/cells.yaml"])
        .args(["-f", "Osmotic Coefficient"])
        .status()
        .unwrap();
    assert!(!status.success());
    let _ = std::fs::remove_file(output);
}
