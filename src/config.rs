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

//! YAML configuration of a [`ReactionEngine`]

use crate::equilibrium::EquilibriumFormulation;
use crate::{ActivityModel, Nucleation, Reaction, ReactionEngine, Solvent, WallLayer};
use anyhow::Context;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

/// Species labels used to name the cell variables of a host solver, e.g. `$yBa_2+`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(deny_unknown_fields, default)]
pub struct SpeciesLabels {
    /// Reacting ion A
    a: String,
    /// Reacting ion B
    b: String,
    /// First inert background ion
    etc1: String,
    /// Second inert background ion
    etc2: String,
}

impl Default for SpeciesLabels {
    fn default() -> Self {
        Self::new("Ba_2+", "SO4_2-")
    }
}

impl SpeciesLabels {
    /// Labels for the reacting ions and the default background labels
    pub fn new(a: &str, b: &str) -> Self {
        Self {
            a: a.to_owned(),
            b: b.to_owned(),
            etc1: "Etc_1-".to_owned(),
            etc2: "Etc_2-".to_owned(),
        }
    }
}

/// Complete description of a precipitation reaction
///
/// # Examples
/// ~~~
/// use precipitation::Config;
/// let yaml = r#"
///   reaction: { nu_a: 1, nu_b: 1, nu_p: -1, z_a: 2, z_b: -2 }
///   nucleation: { molar_mass: 0.1000894, surface_tension: 0.04, density: 2710 }
///   activity: DebyeHuckel
/// "#;
/// let config: Config = serde_yaml::from_str(yaml).unwrap();
/// assert!(config.engine().is_ok());
/// ~~~
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, Getters)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Stoichiometry and charges
    #[validate(nested)]
    reaction: Reaction,
    /// Solvent, defaults to water
    #[serde(default)]
    #[validate(nested)]
    solvent: Solvent,
    /// Equilibrium constant formulation
    #[serde(default)]
    #[validate(custom(function = "validate_equilibrium"))]
    equilibrium: EquilibriumFormulation,
    /// Activity coefficient model
    #[serde(default)]
    activity: ActivityModel,
    /// Nucleation kinetics of the precipitate
    #[validate(nested)]
    nucleation: Nucleation,
    /// Diffusion layer at walls
    #[serde(default)]
    #[validate(nested)]
    wall: WallLayer,
    /// Labels of the species in the host solver
    #[serde(default)]
    species: SpeciesLabels,
}

fn validate_equilibrium(equilibrium: &EquilibriumFormulation) -> Result<(), ValidationError> {
    match equilibrium {
        EquilibriumFormulation::VantHoff(model) if model.reference_temperature <= 0.0 => Err(
            ValidationError::new("reference temperature must be positive"),
        ),
        EquilibriumFormulation::Empirical(model) if model.coeffs.iter().any(|c| !c.is_finite()) => {
            Err(ValidationError::new("coefficients must be finite"))
        }
        _ => Ok(()),
    }
}

impl Config {
    pub fn new(
        reaction: Reaction,
        solvent: Solvent,
        equilibrium: EquilibriumFormulation,
        activity: ActivityModel,
        nucleation: Nucleation,
        wall: WallLayer,
        species: SpeciesLabels,
    ) -> Self {
        Self {
            reaction,
            solvent,
            equilibrium,
            activity,
            nucleation,
            wall,
            species,
        }
    }

    /// Barium sulfate in water
    pub fn barite() -> Self {
        Self::new(
            Reaction::BARITE,
            Solvent::default(),
            EquilibriumFormulation::default(),
            ActivityModel::default(),
            Nucleation::BARITE,
            WallLayer::default(),
            SpeciesLabels::default(),
        )
    }

    /// Load and validate configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read input file {:?}", path.as_ref()))?;
        let config: Self = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse input file {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and build the reaction engine
    pub fn engine(&self) -> anyhow::Result<ReactionEngine> {
        self.validate()?;
        let engine = ReactionEngine::new(
            self.reaction,
            self.solvent,
            self.equilibrium,
            self.activity,
            self.nucleation,
            self.wall,
        );
        engine.log_info();
        Ok(engine)
    }
}
