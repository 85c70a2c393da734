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

//! # Stoichiometry of a binary precipitation reaction
//!
//! A reaction νᴬ·A + νᴮ·B ⇌ νᴾ·P(s) between two dissolved ions, A and B, with
//! charges 𝑧ᴬ and 𝑧ᴮ. Concentrations enter as mole fractions and are converted
//! to molalities (mol/kg solvent).

use crate::{MIN_IONIC_STRENGTH, SMALL};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Local state of a single computational cell
///
/// Mole fractions must be non-negative with a sum below unity and the temperature
/// must be positive. This is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CellState {
    /// Temperature in Kelvin
    pub temperature: f64,
    /// Mole fraction of reacting ion A
    pub y_a: f64,
    /// Mole fraction of reacting ion B
    pub y_b: f64,
    /// Mole fraction of first inert background ion
    pub y_etc1: f64,
    /// Mole fraction of second inert background ion
    pub y_etc2: f64,
}

impl CellState {
    pub const fn new(temperature: f64, y_a: f64, y_b: f64, y_etc1: f64, y_etc2: f64) -> Self {
        Self {
            temperature,
            y_a,
            y_b,
            y_etc1,
            y_etc2,
        }
    }
}

/// Molalities derived from a [`CellState`] (mol/kg)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Molalities {
    /// Total molality of the solution
    pub total: f64,
    /// Molality of ion A
    pub a: f64,
    /// Molality of ion B
    pub b: f64,
    /// Stoichiometry weighted geometric mean of `a` and `b`
    pub mean: f64,
}

impl Molalities {
    /// True if either reacting ion is effectively absent
    pub fn is_depleted(&self) -> bool {
        self.a.min(self.b) < SMALL
    }
}

/// Stoichiometric coefficients and charges of a binary precipitation reaction
///
/// # Examples
/// ~~~
/// use precipitation::Reaction;
/// let barite = Reaction::BARITE;
/// assert_eq!(barite.nu(), 2.0);
/// approx::assert_relative_eq!(barite.mean_molality(1e-3, 1e-3), 1e-3, max_relative = 1e-9);
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, Getters)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_reaction"))]
pub struct Reaction {
    /// Moles of A per reaction unit
    nu_a: f64,
    /// Moles of B per reaction unit
    nu_b: f64,
    /// Moles of product per reaction unit (negative for a precipitate)
    nu_p: f64,
    /// Valency of A
    z_a: f64,
    /// Valency of B
    z_b: f64,
    /// Valencies of the two inert background ions
    #[serde(default = "default_background_charges")]
    background_charges: [f64; 2],
}

const fn default_background_charges() -> [f64; 2] {
    [1.0, 2.0]
}

fn validate_reaction(reaction: &Reaction) -> Result<(), ValidationError> {
    if reaction.nu_a < 0.0 || reaction.nu_b < 0.0 {
        return Err(ValidationError::new("negative stoichiometric coefficient"));
    }
    if reaction.nu() <= 0.0 {
        return Err(ValidationError::new("nu_a + nu_b must be positive"));
    }
    Ok(())
}

impl Reaction {
    /// Barium sulfate, Ba²⁺ + SO₄²⁻ ⇌ BaSO₄(s), with monovalent and divalent background ions
    pub const BARITE: Reaction = Reaction::new(1.0, 1.0, -1.0, 2.0, -2.0);

    /// Create new reaction with the default background charges, `[1, 2]`.
    /// This function performs no sanity checks.
    pub const fn new(nu_a: f64, nu_b: f64, nu_p: f64, z_a: f64, z_b: f64) -> Self {
        Self {
            nu_a,
            nu_b,
            nu_p,
            z_a,
            z_b,
            background_charges: default_background_charges(),
        }
    }

    /// Replace the valencies of the inert background ions
    pub const fn with_background_charges(mut self, charges: [f64; 2]) -> Self {
        self.background_charges = charges;
        self
    }

    /// Total stoichiometric coefficient of the ions, ν = νᴬ + νᴮ
    pub fn nu(&self) -> f64 {
        self.nu_a + self.nu_b
    }

    /// Absolute product of the ion valencies, |𝑧ᴬ·𝑧ᴮ|
    pub fn charge_product(&self) -> f64 {
        (self.z_a * self.z_b).abs()
    }

    /// Total molality of the solution given the background mole fractions
    pub fn total_molality(&self, y_etc1: f64, y_etc2: f64) -> f64 {
        total_molality(y_etc1, y_etc2, crate::solvent::WATER_MOLAR_MASS)
    }

    /// Mean molality, 𝑚± = (𝑚ᴬ^νᴬ·𝑚ᴮ^νᴮ)^(1/ν), from the two ion molalities.
    ///
    /// Molalities are floored at [`SMALL`] so that the fractional powers stay defined.
    pub fn mean_molality(&self, m_a: f64, m_b: f64) -> f64 {
        (m_a.max(SMALL).powf(self.nu_a) * m_b.max(SMALL).powf(self.nu_b) + SMALL)
            .powf(self.nu().recip())
    }

    /// Mean molality from mole fractions
    pub fn mean_molality_from_fractions(
        &self,
        y_a: f64,
        y_b: f64,
        y_etc1: f64,
        y_etc2: f64,
    ) -> f64 {
        let total = self.total_molality(y_etc1, y_etc2);
        self.mean_molality(y_a * total, y_b * total)
    }

    /// All molalities of a cell in water
    pub fn molalities(&self, cell: &CellState) -> Molalities {
        self.molalities_in(cell, crate::solvent::WATER_MOLAR_MASS)
    }

    /// All molalities of a cell in a solvent with the given molar mass (kg/mol)
    pub fn molalities_in(&self, cell: &CellState, solvent_molar_mass: f64) -> Molalities {
        let total = total_molality(cell.y_etc1, cell.y_etc2, solvent_molar_mass);
        let (a, b) = (cell.y_a * total, cell.y_b * total);
        Molalities {
            total,
            a,
            b,
            mean: self.mean_molality(a, b),
        }
    }

    /// Ionic strength of the background ions in water (mol/kg)
    pub fn ionic_strength(&self, y_etc1: f64, y_etc2: f64) -> f64 {
        self.background_ionic_strength(self.total_molality(y_etc1, y_etc2), y_etc1, y_etc2)
    }

    /// Ionic strength of the background ions given the total molality (mol/kg)
    pub(crate) fn background_ionic_strength(&self, total: f64, y_etc1: f64, y_etc2: f64) -> f64 {
        ionic_strength(&[y_etc1 * total, y_etc2 * total], &self.background_charges)
    }
}

/// Total molality, 𝑚 = 1 / (𝑀/(1 - 𝑦₁ - 𝑦₂) + ε), where 𝑀 is the solvent molar mass
pub(crate) fn total_molality(y_etc1: f64, y_etc2: f64, solvent_molar_mass: f64) -> f64 {
    (solvent_molar_mass / (1.0 - (y_etc1 + y_etc2)) + SMALL).recip()
}

/// Ionic strength, 𝐼 = ½·Σ𝑚ᵢ𝑧ᵢ², bounded from below by [`MIN_IONIC_STRENGTH`].
///
/// # Examples
/// ~~~
/// use precipitation::ionic_strength;
/// assert_eq!(ionic_strength(&[0.1, 0.1], &[2.0, -2.0]), 0.4);
/// assert_eq!(ionic_strength(&[0.0], &[1.0]), 1e-18);
/// ~~~
pub fn ionic_strength(molalities: &[f64], valencies: &[f64]) -> f64 {
    let sum: f64 = std::iter::zip(molalities, valencies)
        .map(|(m, z)| m * z * z)
        .sum();
    (0.5 * sum).max(MIN_IONIC_STRENGTH)
}
