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

//! # Temperature dependent equilibrium constants
//!
//! The solubility product, 𝐾(𝑇), of the precipitation reaction can be obtained from
//!
//! Model                    | 𝐾(𝑇)
//! ------------------------ | ---------------------------------------------
//! [`VantHoff`]             | 10^(log 𝐾₀ + Δ𝐻/𝑅·(1/𝑇₀ - 1/𝑇))
//! [`EmpiricalEquilibrium`] | 10^(𝑎 + 𝑏𝑇 + 𝑐/𝑇 + 𝑑·log 𝑇)
//!
//! The active model is selected once through [`EquilibriumFormulation`].

use crate::{GAS_CONSTANT, JOULE_PER_KILOCALORIE, STANDARD_TEMPERATURE};
use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};

/// Trait for objects that has a temperature dependent equilibrium constant
pub trait EquilibriumConstant {
    /// Equilibrium constant at a temperature in Kelvin, 𝑇 > 0
    fn equilibrium(&self, temperature: f64) -> f64;
    /// Base-10 logarithm of the equilibrium constant
    fn log_equilibrium(&self, temperature: f64) -> f64 {
        self.equilibrium(temperature).log10()
    }
}

/// Van't Hoff equation with constant reaction enthalpy
///
/// # Examples
/// ~~~
/// use precipitation::equilibrium::{EquilibriumConstant, VantHoff};
/// let barite = VantHoff::BARITE;
/// assert_eq!(barite.equilibrium(298.15), 10f64.powf(-9.87));
/// assert!(barite.equilibrium(350.0) > barite.equilibrium(298.15));
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VantHoff {
    /// Base-10 logarithm of the equilibrium constant at the reference temperature
    pub log_k: f64,
    /// Reaction enthalpy in J/mol
    pub delta_h: f64,
    /// Reference temperature in Kelvin
    #[serde(default = "default_reference_temperature")]
    pub reference_temperature: f64,
}

fn default_reference_temperature() -> f64 {
    STANDARD_TEMPERATURE
}

impl VantHoff {
    /// Barite solubility from the PHREEQC database, log 𝐾 = -9.87 and Δ𝐻 = 6.35 kcal/mol
    pub const BARITE: VantHoff =
        VantHoff::new(-9.87, 6.35 * JOULE_PER_KILOCALORIE, STANDARD_TEMPERATURE);

    pub const fn new(log_k: f64, delta_h: f64, reference_temperature: f64) -> Self {
        Self {
            log_k,
            delta_h,
            reference_temperature,
        }
    }
}

impl EquilibriumConstant for VantHoff {
    fn equilibrium(&self, temperature: f64) -> f64 {
        10f64.powf(self.log_equilibrium(temperature))
    }
    fn log_equilibrium(&self, temperature: f64) -> f64 {
        self.log_k
            + self.delta_h / GAS_CONSTANT
                * (self.reference_temperature.recip() - temperature.recip())
    }
}

/// Empirical fit of log 𝐾 as a function of temperature
///
/// # Examples
/// ~~~
/// use precipitation::equilibrium::{EquilibriumConstant, EmpiricalEquilibrium};
/// let log_k = EmpiricalEquilibrium::BARITE.log_equilibrium(298.15);
/// approx::assert_abs_diff_eq!(log_k, -9.84, epsilon = 0.01);
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmpiricalEquilibrium {
    /// Coefficients 𝑎, 𝑏, 𝑐, 𝑑 of log 𝐾 = 𝑎 + 𝑏𝑇 + 𝑐/𝑇 + 𝑑·log 𝑇
    pub coeffs: [f64; 4],
}

impl EmpiricalEquilibrium {
    /// Barite analytical expression from the PHREEQC database
    pub const BARITE: EmpiricalEquilibrium =
        EmpiricalEquilibrium::new([-282.43, -8.972e-2, 5822.0, 113.08]);

    pub const fn new(coeffs: [f64; 4]) -> Self {
        Self { coeffs }
    }
}

impl EquilibriumConstant for EmpiricalEquilibrium {
    fn equilibrium(&self, temperature: f64) -> f64 {
        10f64.powf(self.log_equilibrium(temperature))
    }
    fn log_equilibrium(&self, temperature: f64) -> f64 {
        let [a, b, c, d] = self.coeffs;
        a + b * temperature + c / temperature + d * temperature.log10()
    }
}

/// Equilibrium constant formulation selected at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EquilibriumFormulation {
    /// Van't Hoff equation, see [`VantHoff`]
    VantHoff(VantHoff),
    /// Empirical analytical expression, see [`EmpiricalEquilibrium`]
    Empirical(EmpiricalEquilibrium),
}

impl Default for EquilibriumFormulation {
    fn default() -> Self {
        Self::VantHoff(VantHoff::BARITE)
    }
}

impl EquilibriumConstant for EquilibriumFormulation {
    fn equilibrium(&self, temperature: f64) -> f64 {
        match self {
            Self::VantHoff(model) => model.equilibrium(temperature),
            Self::Empirical(model) => model.equilibrium(temperature),
        }
    }
    fn log_equilibrium(&self, temperature: f64) -> f64 {
        match self {
            Self::VantHoff(model) => model.log_equilibrium(temperature),
            Self::Empirical(model) => model.log_equilibrium(temperature),
        }
    }
}

impl From<VantHoff> for EquilibriumFormulation {
    fn from(model: VantHoff) -> Self {
        Self::VantHoff(model)
    }
}

impl From<EmpiricalEquilibrium> for EquilibriumFormulation {
    fn from(model: EmpiricalEquilibrium) -> Self {
        Self::Empirical(model)
    }
}

impl Display for EquilibriumFormulation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::VantHoff(m) => write!(
                f,
                "Van't Hoff: log 𝐾₀ = {:.2}, Δ𝐻 = {:.2} kJ/mol, 𝑇₀ = {:.2} K",
                m.log_k,
                m.delta_h * 1e-3,
                m.reference_temperature
            ),
            Self::Empirical(m) => write!(
                f,
                "Empirical: log 𝐾 = {:.3e} + {:.3e}𝑇 + {:.3e}/𝑇 + {:.3e}·log 𝑇",
                m.coeffs[0], m.coeffs[1], m.coeffs[2], m.coeffs[3]
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn vant_hoff_at_reference_temperature() {
        for delta_h in [-5e4, 0.0, 1.0, 2.6e4, 1e6] {
            let model = VantHoff::new(-9.87, delta_h, 298.15);
            assert_eq!(model.equilibrium(298.15), 10f64.powf(-9.87));
        }
    }

    #[test]
    fn vant_hoff_temperature_dependence() {
        let model = VantHoff::BARITE;
        let (t1, t2) = (298.15, 323.15);
        let expected = model.delta_h / GAS_CONSTANT * (1.0 / t1 - 1.0 / t2);
        assert_approx_eq!(
            f64,
            model.log_equilibrium(t2) - model.log_equilibrium(t1),
            expected,
            epsilon = 1e-12
        );
        // endothermic dissolution: solubility increases with temperature
        assert!(model.equilibrium(t2) > model.equilibrium(t1));
    }

    #[test]
    fn empirical() {
        let model = EmpiricalEquilibrium::new([1.0, 0.0, 0.0, 0.0]);
        assert_approx_eq!(f64, model.equilibrium(300.0), 10.0, epsilon = 1e-12);
        let model = EmpiricalEquilibrium::new([0.0, 0.0, 0.0, 1.0]);
        assert_approx_eq!(f64, model.equilibrium(300.0), 300.0, epsilon = 1e-9);
        let model = EmpiricalEquilibrium::new([0.0, 1e-3, 100.0, 0.0]);
        assert_approx_eq!(f64, model.log_equilibrium(200.0), 0.2 + 0.5, epsilon = 1e-12);
    }

    #[test]
    fn formulation_dispatch() {
        let vant_hoff: EquilibriumFormulation = VantHoff::BARITE.into();
        let empirical: EquilibriumFormulation = EmpiricalEquilibrium::BARITE.into();
        assert_eq!(
            vant_hoff.equilibrium(310.0),
            VantHoff::BARITE.equilibrium(310.0)
        );
        assert_eq!(
            empirical.equilibrium(310.0),
            EmpiricalEquilibrium::BARITE.equilibrium(310.0)
        );
        // both barite parameterizations agree to within 0.2 log units at room temperature
        let difference = vant_hoff.log_equilibrium(298.15) - empirical.log_equilibrium(298.15);
        assert!(difference.abs() < 0.2);
    }

    #[test]
    fn yaml_tags() {
        let model: EquilibriumFormulation =
            serde_yaml::from_str("!VantHoff { log_k: -9.87, delta_h: 26586.18 }").unwrap();
        assert_eq!(
            model,
            EquilibriumFormulation::VantHoff(VantHoff::new(-9.87, 26586.18, 298.15))
        );
        let model: EquilibriumFormulation =
            serde_yaml::from_str("!Empirical { coeffs: [-282.43, -0.08972, 5822.0, 113.08] }")
                .unwrap();
        assert_eq!(model, EquilibriumFormulation::from(EmpiricalEquilibrium::BARITE));
    }
}
