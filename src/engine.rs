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

//! # Reaction engine
//!
//! Composition of stoichiometry, solvent, equilibrium, activity and nucleation models
//! into a single evaluator. All quantities are available per cell, taking a
//! [`CellState`], and element-wise over slices of cell fields, see [`CellFields`].

use crate::activity::{ActivityCoefficient, IonicEnvironment};
use crate::equilibrium::EquilibriumConstant;
use crate::nucleation;
use crate::{
    ActivityModel, CellState, EquilibriumFormulation, Molalities, Nucleation, Reaction, Solvent,
    WallLayer, SMALL,
};
use anyhow::Result;
use derive_getters::Getters;
use itertools::izip;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Borrowed slices of the cell fields entering all element-wise operations
///
/// All slices have the same length. The fields are private so that
/// [`CellFields::new`] is the only way to construct, which checks the lengths:
///
/// ~~~compile_fail
/// use precipitation::CellFields;
/// let cells = CellFields {
///     temperature: &[298.15, 298.15],
///     y_a: &[1e-5],
///     y_b: &[1e-5],
///     y_etc1: &[0.0],
///     y_etc2: &[0.0],
/// };
/// ~~~
#[derive(Debug, Clone, Copy)]
pub struct CellFields<'a> {
    temperature: &'a [f64],
    y_a: &'a [f64],
    y_b: &'a [f64],
    y_etc1: &'a [f64],
    y_etc2: &'a [f64],
}

impl<'a> CellFields<'a> {
    pub fn new(
        temperature: &'a [f64],
        y_a: &'a [f64],
        y_b: &'a [f64],
        y_etc1: &'a [f64],
        y_etc2: &'a [f64],
    ) -> Result<Self> {
        let n = temperature.len();
        for (name, field) in [("y_a", y_a), ("y_b", y_b), ("y_etc1", y_etc1), ("y_etc2", y_etc2)] {
            check_length(name, field.len(), n)?;
        }
        Ok(Self {
            temperature,
            y_a,
            y_b,
            y_etc1,
            y_etc2,
        })
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }

    /// Temperatures in Kelvin
    pub fn temperature(&self) -> &'a [f64] {
        self.temperature
    }

    /// Mole fractions of reacting ion A
    pub fn y_a(&self) -> &'a [f64] {
        self.y_a
    }

    /// Mole fractions of reacting ion B
    pub fn y_b(&self) -> &'a [f64] {
        self.y_b
    }

    /// Mole fractions of the first background ion
    pub fn y_etc1(&self) -> &'a [f64] {
        self.y_etc1
    }

    /// Mole fractions of the second background ion
    pub fn y_etc2(&self) -> &'a [f64] {
        self.y_etc2
    }

    /// State of the i'th cell
    pub fn cell(&self, i: usize) -> CellState {
        CellState::new(
            self.temperature[i],
            self.y_a[i],
            self.y_b[i],
            self.y_etc1[i],
            self.y_etc2[i],
        )
    }

    /// Iterate over all cell states
    pub fn iter(&self) -> impl Iterator<Item = CellState> + 'a {
        izip!(
            self.temperature,
            self.y_a,
            self.y_b,
            self.y_etc1,
            self.y_etc2
        )
        .map(|(&t, &y_a, &y_b, &y_etc1, &y_etc2)| CellState::new(t, y_a, y_b, y_etc1, y_etc2))
    }
}

fn check_length(name: &str, len: usize, expected: usize) -> Result<()> {
    if len != expected {
        anyhow::bail!(
            "field `{}` has {} elements but {} were expected",
            name,
            len,
            expected
        );
    }
    Ok(())
}

/// Write `f(i)` into every element of `out`
fn fill<F>(out: &mut [f64], f: F)
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    out.par_iter_mut().enumerate().for_each(|(i, o)| *o = f(i));
    #[cfg(not(feature = "parallel"))]
    out.iter_mut().enumerate().for_each(|(i, o)| *o = f(i));
}

/// Evaluator of a single binary precipitation reaction
///
/// The engine is plain data and thus `Send + Sync`; all operations are pure.
///
/// # Examples
/// ~~~
/// use precipitation::{CellState, ReactionEngine};
/// let engine = ReactionEngine::barite();
/// let cell = CellState::new(298.15, 1e-5, 1e-5, 0.0, 0.0);
/// assert!(engine.saturation_rate(&cell) > 1.0);
/// assert_eq!(engine.activity_coefficient(&cell), 1.0); // no background ions
/// ~~~
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ReactionEngine {
    reaction: Reaction,
    solvent: Solvent,
    equilibrium_model: EquilibriumFormulation,
    activity_model: ActivityModel,
    nucleation: Nucleation,
    wall: WallLayer,
}

impl ReactionEngine {
    pub fn new(
        reaction: Reaction,
        solvent: Solvent,
        equilibrium: EquilibriumFormulation,
        activity: ActivityModel,
        nucleation: Nucleation,
        wall: WallLayer,
    ) -> Self {
        Self {
            reaction,
            solvent,
            equilibrium_model: equilibrium,
            activity_model: activity,
            nucleation,
            wall,
        }
    }

    /// Barite in water with Van't Hoff equilibrium and the Pitzer model without virial terms
    pub fn barite() -> Self {
        Self::new(
            Reaction::BARITE,
            Solvent::default(),
            EquilibriumFormulation::default(),
            ActivityModel::default(),
            Nucleation::BARITE,
            WallLayer::default(),
        )
    }

    /// Log the active models
    ///
    /// The permittivity interval is checked at 298.15 K only; cell temperatures
    /// are not known at this point and are never checked.
    pub(crate) fn log_info(&self) {
        log::info!(
            "Reaction: νᴬ = {}, νᴮ = {}, νᴾ = {}, 𝑧ᴬ = {}, 𝑧ᴮ = {}",
            self.reaction.nu_a(),
            self.reaction.nu_b(),
            self.reaction.nu_p(),
            self.reaction.z_a(),
            self.reaction.z_b()
        );
        log::info!("{}", self.solvent);
        log::info!("Equilibrium: {}", self.equilibrium_model);
        log::info!("Activity: {}", self.activity_model);
        log::info!("{}", self.nucleation);
        log::info!(
            "Wall: diffusion layer = {:.2e} m, transition layer = {:.2e} m",
            self.wall.diffusion_layer_thickness(),
            self.wall.transition_layer_thickness()
        );
        if !self.solvent.permittivity().temperature_is_ok(crate::STANDARD_TEMPERATURE) {
            log::warn!(
                "Solvent permittivity model is not valid at 298.15 K; cell temperatures are not checked"
            );
        }
    }

    /// Molalities of a cell in the solvent
    pub fn molalities(&self, cell: &CellState) -> Molalities {
        self.reaction.molalities_in(cell, *self.solvent.molar_mass())
    }

    /// Mean molality of the reacting ions (mol/kg)
    pub fn mean_molality(&self, cell: &CellState) -> f64 {
        self.molalities(cell).mean
    }

    /// Equilibrium constant at a temperature in Kelvin
    pub fn equilibrium(&self, temperature: f64) -> f64 {
        self.equilibrium_model.equilibrium(temperature)
    }

    /// Ionic strength due to the background ions (mol/kg)
    pub fn ionic_strength(&self, cell: &CellState) -> f64 {
        let total = self.molalities(cell).total;
        self.reaction
            .background_ionic_strength(total, cell.y_etc1, cell.y_etc2)
    }

    fn environment(&self, cell: &CellState, molalities: &Molalities) -> IonicEnvironment<'_> {
        IonicEnvironment {
            reaction: &self.reaction,
            solvent: &self.solvent,
            temperature: cell.temperature,
            ionic_strength: self.reaction.background_ionic_strength(
                molalities.total,
                cell.y_etc1,
                cell.y_etc2,
            ),
            mean_molality: molalities.mean,
        }
    }

    /// Mean activity coefficient of the reacting ions
    pub fn activity_coefficient(&self, cell: &CellState) -> f64 {
        let molalities = self.molalities(cell);
        self.activity_model
            .activity_coefficient(&self.environment(cell, &molalities))
    }

    /// Saturation rate, 𝑆 = (𝑚±γ±)^ν / 𝐾.
    ///
    /// Exactly [`SMALL`] if either reacting ion is depleted.
    pub fn saturation_rate(&self, cell: &CellState) -> f64 {
        let molalities = self.molalities(cell);
        if molalities.is_depleted() {
            return SMALL;
        }
        let gamma = self
            .activity_model
            .activity_coefficient(&self.environment(cell, &molalities));
        (molalities.mean * gamma).powf(self.reaction.nu()) / self.equilibrium(cell.temperature)
    }

    /// Saturation index, SI = log₁₀ 𝑆
    pub fn saturation_index(&self, cell: &CellState) -> f64 {
        self.saturation_rate(cell).log10()
    }

    /// Molality of A at a saturated wall, min(𝑚ᴬ, 𝑚ᴬ/𝑆)
    pub fn wall_concentration_a(&self, cell: &CellState) -> f64 {
        let m_a = self.molalities(cell).a;
        m_a.min(m_a / self.saturation_rate(cell))
    }

    /// Molality of B at a saturated wall, min(𝑚ᴮ, 𝑚ᴮ/𝑆)
    pub fn wall_concentration_b(&self, cell: &CellState) -> f64 {
        let m_b = self.molalities(cell).b;
        m_b.min(m_b / self.saturation_rate(cell))
    }

    /// Deposition rate at the wall in mol/kg, see [`nucleation::wall_reaction_rate_molality`]
    pub fn wall_reaction_rate_molality(
        &self,
        cell: &CellState,
        saturation_index: f64,
        wall_distance: f64,
    ) -> f64 {
        nucleation::wall_reaction_rate_molality(
            &self.wall,
            &self.molalities(cell),
            saturation_index,
            wall_distance,
        )
    }

    /// Deposition rate at the wall as mole fraction, i.e. the molality rate divided by the total molality
    pub fn wall_reaction_rate_mole_fraction(
        &self,
        cell: &CellState,
        saturation_index: f64,
        wall_distance: f64,
    ) -> f64 {
        self.wall_reaction_rate_molality(cell, saturation_index, wall_distance)
            / self.molalities(cell).total
    }

    /// Nucleation rate with the saturation index obtained from `saturation_index`.
    ///
    /// The nucleation model is evaluated at 𝑆 = SI¹⁰.
    pub fn nucleation_rate<F>(&self, cell: &CellState, saturation_index: F) -> f64
    where
        F: Fn(&Self, &CellState) -> f64,
    {
        let saturation_ratio = saturation_index(self, cell).powi(10);
        self.nucleation
            .nucleation_rate(saturation_ratio, cell.temperature)
    }

    /// Precipitate mass produced per volume and time in the bulk, see [`Nucleation::bulk_reaction_rate`]
    pub fn bulk_reaction_rate(
        &self,
        saturation_ratio: f64,
        temperature: f64,
        wall_distance: f64,
    ) -> f64 {
        self.nucleation
            .bulk_reaction_rate(&self.wall, saturation_ratio, temperature, wall_distance)
    }
}

/// Element-wise operations.
///
/// Each writes one value per cell into `out`. An error is returned, and nothing
/// written, if the slice lengths differ.
impl ReactionEngine {
    fn map_cells<F>(&self, out: &mut [f64], cells: &CellFields, f: F) -> Result<()>
    where
        F: Fn(usize, &CellState) -> f64 + Sync + Send,
    {
        check_length("out", out.len(), cells.len())?;
        fill(out, |i| f(i, &cells.cell(i)));
        Ok(())
    }

    pub fn mean_molalities(&self, out: &mut [f64], cells: &CellFields) -> Result<()> {
        self.map_cells(out, cells, |_, cell| self.mean_molality(cell))
    }

    pub fn equilibria(&self, out: &mut [f64], temperature: &[f64]) -> Result<()> {
        check_length("out", out.len(), temperature.len())?;
        fill(out, |i| self.equilibrium(temperature[i]));
        Ok(())
    }

    pub fn ionic_strengths(&self, out: &mut [f64], cells: &CellFields) -> Result<()> {
        self.map_cells(out, cells, |_, cell| self.ionic_strength(cell))
    }

    pub fn activity_coefficients(&self, out: &mut [f64], cells: &CellFields) -> Result<()> {
        self.map_cells(out, cells, |_, cell| self.activity_coefficient(cell))
    }

    pub fn saturation_rates(&self, out: &mut [f64], cells: &CellFields) -> Result<()> {
        self.map_cells(out, cells, |_, cell| self.saturation_rate(cell))
    }

    pub fn saturation_indices(&self, out: &mut [f64], cells: &CellFields) -> Result<()> {
        self.map_cells(out, cells, |_, cell| self.saturation_index(cell))
    }

    pub fn wall_concentrations_a(&self, out: &mut [f64], cells: &CellFields) -> Result<()> {
        self.map_cells(out, cells, |_, cell| self.wall_concentration_a(cell))
    }

    pub fn wall_concentrations_b(&self, out: &mut [f64], cells: &CellFields) -> Result<()> {
        self.map_cells(out, cells, |_, cell| self.wall_concentration_b(cell))
    }

    /// Activity corrected equilibrium, (𝐾γ)^(1/ν)
    pub fn activity_corrected_equilibria(
        &self,
        out: &mut [f64],
        equilibrium: &[f64],
        activity: &[f64],
    ) -> Result<()> {
        check_length("equilibrium", equilibrium.len(), out.len())?;
        check_length("activity", activity.len(), out.len())?;
        let exponent = self.reaction.nu().recip();
        for (o, k, gamma) in izip!(out.iter_mut(), equilibrium, activity) {
            *o = (k * gamma).powf(exponent);
        }
        Ok(())
    }

    pub fn wall_reaction_rates_molality(
        &self,
        out: &mut [f64],
        cells: &CellFields,
        saturation_index: &[f64],
        wall_distance: &[f64],
    ) -> Result<()> {
        check_length("saturation_index", saturation_index.len(), cells.len())?;
        check_length("wall_distance", wall_distance.len(), cells.len())?;
        self.map_cells(out, cells, |i, cell| {
            self.wall_reaction_rate_molality(cell, saturation_index[i], wall_distance[i])
        })
    }

    pub fn wall_reaction_rates_mole_fraction(
        &self,
        out: &mut [f64],
        cells: &CellFields,
        saturation_index: &[f64],
        wall_distance: &[f64],
    ) -> Result<()> {
        check_length("saturation_index", saturation_index.len(), cells.len())?;
        check_length("wall_distance", wall_distance.len(), cells.len())?;
        self.map_cells(out, cells, |i, cell| {
            self.wall_reaction_rate_mole_fraction(cell, saturation_index[i], wall_distance[i])
        })
    }

    /// Nucleation rates where `saturation_index` maps each cell to its saturation index
    ///
    /// # Examples
    /// ~~~
    /// use precipitation::{CellFields, ReactionEngine};
    /// let engine = ReactionEngine::barite();
    /// let temperature = [298.15, 298.15];
    /// let (y_a, y_b, zero) = ([1e-7, 1e-3], [1e-7, 1e-3], [0.0; 2]);
    /// let cells = CellFields::new(&temperature, &y_a, &y_b, &zero, &zero).unwrap();
    /// let mut rates = [f64::NAN; 2];
    /// engine
    ///     .nucleation_rates(&mut rates, &cells, ReactionEngine::saturation_index)
    ///     .unwrap();
    /// assert_eq!(rates[0], 0.0);
    /// assert!(rates[1] > 0.0);
    /// ~~~
    pub fn nucleation_rates<F>(
        &self,
        out: &mut [f64],
        cells: &CellFields,
        saturation_index: F,
    ) -> Result<()>
    where
        F: Fn(&Self, &CellState) -> f64 + Sync + Send,
    {
        self.map_cells(out, cells, |_, cell| {
            self.nucleation_rate(cell, &saturation_index)
        })
    }
}
