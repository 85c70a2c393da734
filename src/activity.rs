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

//! # Mean ionic activity coefficients
//!
//! Models for the mean activity coefficient, γ±, of the reacting ions:
//!
//! Model          | ln γ±
//! -------------- | --------------------------------------------------------
//! Ideal          | 0
//! Debye-Hückel   | -|𝑧ᴬ𝑧ᴮ|·𝐴·√𝐼
//! [`Pitzer`]     | |𝑧ᴬ𝑧ᴮ|·𝑓ᵞ + 𝑚±·(2νᴬνᴮ/ν)·𝐵ᵞ + 𝑚±²·(2(νᴬνᴮ)^(3/2)/ν)·𝐶ᵞ
//!
//! where 𝐴 is the Debye-Hückel parameter of the solvent, see
//! [`Solvent::debye_huckel_parameter`].
//! All models return unity when the ionic strength is below [`SMALL`].

use crate::{Reaction, Solvent, SMALL};
use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};

/// Ionic environment of the reacting ions in a single cell
#[derive(Debug, Clone, Copy)]
pub struct IonicEnvironment<'a> {
    pub reaction: &'a Reaction,
    pub solvent: &'a Solvent,
    /// Temperature in Kelvin
    pub temperature: f64,
    /// Ionic strength in mol/kg
    pub ionic_strength: f64,
    /// Mean molality of the reacting ions in mol/kg
    pub mean_molality: f64,
}

impl IonicEnvironment<'_> {
    /// True if the ionic strength is too small for the models to be evaluated
    fn is_dilute(&self) -> bool {
        self.ionic_strength < SMALL
    }
    fn debye_huckel_parameter(&self) -> f64 {
        self.solvent.debye_huckel_parameter(self.temperature)
    }
}

/// Trait for models of the mean ionic activity coefficient
pub trait ActivityCoefficient {
    /// Natural logarithm of the mean activity coefficient
    fn ln_activity_coefficient(&self, environment: &IonicEnvironment) -> f64;
    /// Mean activity coefficient, γ± ≥ 0
    fn activity_coefficient(&self, environment: &IonicEnvironment) -> f64 {
        self.ln_activity_coefficient(environment).exp()
    }
}

/// Pitzer's single electrolyte ion-interaction model
///
/// Setting all parameters to zero reduces the model to the Debye-Hückel term
/// of Pitzer, 𝑓ᵞ, which is the default for barite.
///
/// See <https://doi.org/10.1021/j100621a026>.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Pitzer {
    #[serde(default)]
    pub beta_0: f64,
    #[serde(default)]
    pub beta_1: f64,
    #[serde(default)]
    pub beta_2: f64,
    #[serde(default)]
    pub c_phi: f64,
}

impl Pitzer {
    const ALPHA_1: f64 = 1.4;
    const ALPHA_2: f64 = 12.0;
    /// Universal Pitzer parameter, 𝑏 (kg/mol)^½
    const B: f64 = 1.2;

    pub const fn new(beta_0: f64, beta_1: f64, beta_2: f64, c_phi: f64) -> Self {
        Self {
            beta_0,
            beta_1,
            beta_2,
            c_phi,
        }
    }

    /// Long range electrostatic term, 𝑓ᵞ = -𝐴/3·(√𝐼/(1 + 𝑏√𝐼) + 2/𝑏·ln(1 + 𝑏√𝐼))
    pub fn f_gamma(debye_huckel_parameter: f64, ionic_strength: f64) -> f64 {
        let sqrt_i = ionic_strength.sqrt();
        -debye_huckel_parameter / 3.0
            * (sqrt_i / (1.0 + Self::B * sqrt_i) + 2.0 / Self::B * (1.0 + Self::B * sqrt_i).ln())
    }

    /// Second virial coefficient, 𝐵ᵞ. The ionic strength must be positive.
    pub fn b_gamma(&self, ionic_strength: f64) -> f64 {
        let sqrt_i = ionic_strength.sqrt();
        let term = |beta: f64, alpha: f64| {
            let alpha_squared = alpha * alpha;
            2.0 * beta / (alpha_squared * ionic_strength)
                * (1.0
                    - (1.0 + alpha * sqrt_i - 0.5 * alpha_squared * ionic_strength)
                        * (-alpha * sqrt_i).exp())
        };
        2.0 * self.beta_0 + term(self.beta_1, Self::ALPHA_1) + term(self.beta_2, Self::ALPHA_2)
    }

    /// Third virial coefficient, 𝐶ᵞ = 3/2·𝐶ᵠ
    pub fn c_gamma(&self) -> f64 {
        1.5 * self.c_phi
    }
}

impl ActivityCoefficient for Pitzer {
    fn ln_activity_coefficient(&self, env: &IonicEnvironment) -> f64 {
        if env.is_dilute() {
            return 0.0;
        }
        let reaction = env.reaction;
        let (nu_a, nu_b, nu) = (*reaction.nu_a(), *reaction.nu_b(), reaction.nu());
        let f_gamma = Self::f_gamma(env.debye_huckel_parameter(), env.ionic_strength);
        reaction.charge_product() * f_gamma
            + env.mean_molality * (2.0 * nu_a * nu_b / nu) * self.b_gamma(env.ionic_strength)
            + env.mean_molality.powi(2) * (2.0 * (nu_a * nu_b).powf(1.5) / nu) * self.c_gamma()
    }
}

/// Debye-Hückel limiting law, ln γ± = -|𝑧ᴬ𝑧ᴮ|·𝐴·√𝐼
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DebyeHuckel;

impl ActivityCoefficient for DebyeHuckel {
    fn ln_activity_coefficient(&self, env: &IonicEnvironment) -> f64 {
        if env.is_dilute() {
            return 0.0;
        }
        -env.reaction.charge_product() * env.debye_huckel_parameter() * env.ionic_strength.sqrt()
    }
}

/// Activity model selected at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivityModel {
    /// Ideal solution, γ± = 1
    Ideal,
    /// Debye-Hückel limiting law
    DebyeHuckel,
    /// Pitzer ion-interaction model
    Pitzer(Pitzer),
}

impl Default for ActivityModel {
    fn default() -> Self {
        Self::Pitzer(Pitzer::default())
    }
}

impl ActivityCoefficient for ActivityModel {
    fn ln_activity_coefficient(&self, env: &IonicEnvironment) -> f64 {
        match self {
            Self::Ideal => 0.0,
            Self::DebyeHuckel => DebyeHuckel.ln_activity_coefficient(env),
            Self::Pitzer(pitzer) => pitzer.ln_activity_coefficient(env),
        }
    }
    fn activity_coefficient(&self, env: &IonicEnvironment) -> f64 {
        // unity is returned exactly in the ideal and dilute limits
        if matches!(self, Self::Ideal) || env.is_dilute() {
            return 1.0;
        }
        self.ln_activity_coefficient(env).exp()
    }
}

impl From<Pitzer> for ActivityModel {
    fn from(pitzer: Pitzer) -> Self {
        Self::Pitzer(pitzer)
    }
}

impl Display for ActivityModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ideal => write!(f, "Ideal activity, γ± = 1"),
            Self::DebyeHuckel => write!(f, "Debye-Hückel limiting law"),
            Self::Pitzer(p) => write!(
                f,
                "Pitzer: β⁰ = {}, β¹ = {}, β² = {}, 𝐶ᵠ = {}",
                p.beta_0, p.beta_1, p.beta_2, p.c_phi
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn environment<'a>(
        reaction: &'a Reaction,
        solvent: &'a Solvent,
        ionic_strength: f64,
        mean_molality: f64,
    ) -> IonicEnvironment<'a> {
        IonicEnvironment {
            reaction,
            solvent,
            temperature: 298.15,
            ionic_strength,
            mean_molality,
        }
    }

    #[test]
    fn dilute_limit_is_exactly_unity() {
        let (reaction, solvent) = (Reaction::BARITE, Solvent::default());
        let env = environment(&reaction, &solvent, 1e-18, 1e-3);
        let pitzer = ActivityModel::Pitzer(Pitzer::new(0.2, 3.2, -50.0, 0.1));
        for model in [ActivityModel::Ideal, ActivityModel::DebyeHuckel, pitzer] {
            assert_eq!(model.activity_coefficient(&env), 1.0);
        }
    }

    #[test]
    fn ideal() {
        let (reaction, solvent) = (Reaction::BARITE, Solvent::default());
        let env = environment(&reaction, &solvent, 0.5, 0.1);
        assert_eq!(ActivityModel::Ideal.activity_coefficient(&env), 1.0);
    }

    #[test]
    fn pitzer_without_parameters_is_debye_huckel_term() {
        let (reaction, solvent) = (Reaction::BARITE, Solvent::default());
        let ionic_strength = 0.01_f64;
        let a = solvent.debye_huckel_parameter(298.15);
        let b = 1.2;
        let f_gamma = -a / 3.0
            * (ionic_strength.sqrt() / (1.0 + b * ionic_strength.sqrt())
                + 2.0 / b * (1.0 + b * ionic_strength.sqrt()).ln());
        let expected = (4.0 * f_gamma).exp();
        let env = environment(&reaction, &solvent, ionic_strength, 1e-3);
        let gamma = ActivityModel::default().activity_coefficient(&env);
        assert_approx_eq!(f64, gamma, expected, epsilon = 1e-14);
        assert!(gamma < 1.0);
    }

    #[test]
    fn pitzer_approaches_limiting_law() {
        let (reaction, solvent) = (Reaction::BARITE, Solvent::default());
        let env = environment(&reaction, &solvent, 1e-8, 1e-6);
        let pitzer = ActivityModel::default().ln_activity_coefficient(&env);
        let limiting = ActivityModel::DebyeHuckel.ln_activity_coefficient(&env);
        assert_approx_eq!(f64, pitzer / limiting, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn pitzer_virial_terms() {
        let (reaction, solvent) = (Reaction::BARITE, Solvent::default());
        let ionic_strength = 0.1;
        let mean_molality = 0.05;
        let env = environment(&reaction, &solvent, ionic_strength, mean_molality);
        let pitzer = Pitzer::new(0.2, 0.0, 0.0, 0.01);
        let expected = 4.0 * Pitzer::f_gamma(solvent.debye_huckel_parameter(298.15), 0.1)
            + mean_molality * 1.0 * (2.0 * 0.2)
            + mean_molality.powi(2) * 1.0 * (1.5 * 0.01);
        assert_approx_eq!(
            f64,
            pitzer.ln_activity_coefficient(&env),
            expected,
            epsilon = 1e-14
        );
    }

    #[test]
    fn b_gamma_limits() {
        // the β¹ and β² contributions vanish at high ionic strength
        let pitzer = Pitzer::new(0.0, 1.0, 1.0, 0.0);
        assert!(pitzer.b_gamma(1e4).abs() < 1e-3);
        // and approach 2β at low ionic strength
        assert_approx_eq!(f64, Pitzer::new(0.0, 1.0, 0.0, 0.0).b_gamma(1e-10), 2.0, epsilon = 1e-4);
        assert_eq!(Pitzer::new(0.3, 0.0, 0.0, 0.0).b_gamma(0.5), 0.6);
    }

    #[test]
    fn yaml_tags() {
        let model: ActivityModel = serde_yaml::from_str("!Pitzer { beta_0: 0.1 }").unwrap();
        assert_eq!(model, ActivityModel::Pitzer(Pitzer::new(0.1, 0.0, 0.0, 0.0)));
        let model: ActivityModel = serde_yaml::from_str("Ideal").unwrap();
        assert_eq!(model, ActivityModel::Ideal);
        let model: ActivityModel = serde_yaml::from_str("DebyeHuckel").unwrap();
        assert_eq!(model, ActivityModel::DebyeHuckel);
    }
}
