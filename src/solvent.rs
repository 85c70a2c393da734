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

//! Solvent properties entering molality conversion and Debye-Hückel theory

use crate::{
    AVOGADRO_CONSTANT, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY,
};
use core::fmt::{self, Display, Formatter};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use validator::Validate;

/// Molar mass of water (kg/mol)
pub(crate) const WATER_MOLAR_MASS: f64 = 18.01528e-3;

/// Empirical model for the temperature dependent relative permittivity, εᵣ(𝑇),
///
/// For more information, see
/// [Neau and Raspo](https://doi.org/10.1016/j.fluid.2019.112371).
///
/// # Example
/// ~~~
/// use precipitation::EmpiricalPermittivity;
/// assert_eq!(EmpiricalPermittivity::WATER.permittivity(298.15), 78.35565171480539);
/// assert!(!EmpiricalPermittivity::WATER.temperature_is_ok(250.0));
/// ~~~
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmpiricalPermittivity {
    /// Coefficients for the model
    coeffs: [f64; 5],
    /// Closed temperature interval in which the model is valid
    temperature_interval: (f64, f64),
}

impl EmpiricalPermittivity {
    pub const fn new(coeffs: &[f64; 5], temperature_interval: (f64, f64)) -> Self {
        Self {
            coeffs: *coeffs,
            temperature_interval,
        }
    }
    /// Relative permittivity of water
    pub const WATER: EmpiricalPermittivity = EmpiricalPermittivity::new(
        &[-1664.4988, -0.884533, 0.0003635, 64839.1736, 308.3394],
        (273.0, 403.0),
    );

    /// Relative permittivity at a given temperature.
    ///
    /// The polynomial is evaluated also outside the fitted interval; see [`Self::temperature_is_ok`].
    pub fn permittivity(&self, temperature: f64) -> f64 {
        self.coeffs[0]
            + self.coeffs[1] * temperature
            + self.coeffs[2] * temperature.powi(2)
            + self.coeffs[3] / temperature
            + self.coeffs[4] * temperature.ln()
    }

    /// Test if the temperature is within the fitted interval
    pub fn temperature_is_ok(&self, temperature: f64) -> bool {
        (self.temperature_interval.0..=self.temperature_interval.1).contains(&temperature)
    }
}

impl Display for EmpiricalPermittivity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "εᵣ(𝑇) = {:.2e} + {:.2e}𝑇 + {:.2e}𝑇² + {:.2e}/𝑇 + {:.2e}㏑(𝑇); 𝑇 = [{:.1}, {:.1}]",
            self.coeffs[0],
            self.coeffs[1],
            self.coeffs[2],
            self.coeffs[3],
            self.coeffs[4],
            self.temperature_interval.0,
            self.temperature_interval.1
        )
    }
}

/// Relative permittivity of the solvent
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Permittivity {
    /// Temperature independent, εᵣ = constant
    Constant(f64),
    /// Temperature dependent, εᵣ(𝑇)
    Empirical(EmpiricalPermittivity),
}

impl Default for Permittivity {
    fn default() -> Self {
        Self::Constant(78.4)
    }
}

impl Permittivity {
    /// Relative permittivity at a given temperature in K
    pub fn permittivity(&self, temperature: f64) -> f64 {
        match self {
            Self::Constant(permittivity) => *permittivity,
            Self::Empirical(model) => model.permittivity(temperature),
        }
    }
    /// Test if the temperature is within the range of the model
    pub fn temperature_is_ok(&self, temperature: f64) -> bool {
        match self {
            Self::Constant(_) => true,
            Self::Empirical(model) => model.temperature_is_ok(temperature),
        }
    }
}

impl Display for Permittivity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(permittivity) => write!(f, "εᵣ = {:.2} for all 𝑇", permittivity),
            Self::Empirical(model) => write!(f, "{}", model),
        }
    }
}

/// # Solvent such as water
///
/// The default is water with the density and permittivity at 25 °C.
///
/// # Examples
/// ~~~
/// use precipitation::Solvent;
/// let water = Solvent::default();
/// approx::assert_relative_eq!(water.debye_huckel_parameter(298.15), 1.1744, max_relative = 1e-3);
/// ~~~
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Validate, Getters)]
#[serde(deny_unknown_fields)]
pub struct Solvent {
    /// Molar mass in kg/mol
    #[validate(range(min = 1e-6))]
    molar_mass: f64,
    /// Mass density in kg/m³
    #[validate(range(min = 1e-6))]
    density: f64,
    /// Relative permittivity
    #[serde(default)]
    permittivity: Permittivity,
}

impl Default for Solvent {
    fn default() -> Self {
        Self::new(WATER_MOLAR_MASS, 997.0, Permittivity::default())
    }
}

impl Solvent {
    pub const fn new(molar_mass: f64, density: f64, permittivity: Permittivity) -> Self {
        Self {
            molar_mass,
            density,
            permittivity,
        }
    }

    /// Debye-Hückel parameter, 𝐴 = √(2π𝑁ᴬρ)·(e²/4πε₀εᵣ𝑘𝑇)^(3/2), in (kg/mol)^½.
    ///
    /// This is the natural logarithm slope of the limiting law, ln γ± = -|𝑧₊𝑧₋|·𝐴·√𝐼,
    /// and equals three times the osmotic coefficient parameter, 𝐴ᵠ.
    pub fn debye_huckel_parameter(&self, temperature: f64) -> f64 {
        let permittivity = self.permittivity.permittivity(temperature);
        let bjerrum_length = ELEMENTARY_CHARGE.powi(2)
            / (4.0
                * PI
                * VACUUM_ELECTRIC_PERMITTIVITY
                * permittivity
                * BOLTZMANN_CONSTANT
                * temperature);
        (2.0 * PI * AVOGADRO_CONSTANT * self.density).sqrt() * bjerrum_length.powf(1.5)
    }
}

impl Display for Solvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solvent: 𝑀 = {:.3} g/mol, ρ = {:.1} kg/m³, {}",
            self.molar_mass * 1e3,
            self.density,
            self.permittivity
        )
    }
}
