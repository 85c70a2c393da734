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

//! # Nucleation and wall deposition kinetics
//!
//! Homogeneous nucleation in the bulk follows classical nucleation theory while
//! deposition at walls is limited by the reagent in shortest supply and weighted
//! by the distance to the wall relative to a diffusion layer, see [`WallLayer`].

use crate::{Molalities, AVOGADRO_CONSTANT, GAS_CONSTANT, SMALL};
use core::fmt::{self, Display, Formatter};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use validator::{Validate, ValidationError};

/// Saturation ratios at or below this value do not nucleate
pub const NUCLEATION_THRESHOLD: f64 = 1.001;

/// Molality gap over which [`driving_molality_rate`] goes from zero to one
pub const DRIVING_MOLALITY_SMOOTHING_GAP: f64 = 1e-8;

/// Geometry of the near-wall region in which deposition takes place
///
/// Cells closer to the wall than 𝐷 - ½𝑇 react entirely at the wall, cells beyond
/// 𝐷 + ½𝑇 entirely in the bulk, where 𝐷 is the diffusion layer thickness and
/// 𝑇 the transition layer thickness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, Getters)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_wall_layer"))]
pub struct WallLayer {
    /// Diffusion layer thickness in meters
    diffusion_layer_thickness: f64,
    /// Transition layer thickness in meters
    transition_layer_thickness: f64,
}

fn validate_wall_layer(wall: &WallLayer) -> Result<(), ValidationError> {
    if wall.transition_layer_thickness <= 0.0 {
        return Err(ValidationError::new("transition layer must be thicker than zero"));
    }
    if wall.diffusion_layer_thickness < 0.5 * wall.transition_layer_thickness {
        return Err(ValidationError::new(
            "transition layer must be contained in the fluid",
        ));
    }
    Ok(())
}

impl Default for WallLayer {
    fn default() -> Self {
        Self::new(1e-3, 2e-4)
    }
}

impl WallLayer {
    pub const fn new(diffusion_layer_thickness: f64, transition_layer_thickness: f64) -> Self {
        Self {
            diffusion_layer_thickness,
            transition_layer_thickness,
        }
    }

    /// Fraction of a cell's content that reacts at the wall, ∈ [0, 1].
    ///
    /// # Examples
    /// ~~~
    /// use precipitation::WallLayer;
    /// let wall = WallLayer::new(1e-3, 2e-4);
    /// assert_eq!(wall.wall_reaction_ratio(0.0), 1.0);
    /// approx::assert_relative_eq!(wall.wall_reaction_ratio(1e-3), 0.5, epsilon = 1e-12);
    /// assert_eq!(wall.wall_reaction_ratio(2e-3), 0.0);
    /// ~~~
    pub fn wall_reaction_ratio(&self, wall_distance: f64) -> f64 {
        let lower = self.diffusion_layer_thickness - 0.5 * self.transition_layer_thickness;
        let upper = self.diffusion_layer_thickness + 0.5 * self.transition_layer_thickness;
        if wall_distance < lower {
            1.0
        } else if wall_distance < upper {
            1.0 - (wall_distance - lower) / self.transition_layer_thickness
        } else {
            0.0
        }
    }
}

/// The molality that limits the reaction rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitingReagent {
    /// Ion A is in shortest supply
    A,
    /// Ion B is in shortest supply
    B,
    /// No clear limiting reagent; the mean molality is used
    Mean,
}

impl LimitingReagent {
    /// Find the limiting reagent from the ion molalities and their mean
    pub fn find(m_a: f64, m_b: f64, m_mean: f64) -> Self {
        if m_a < m_b && m_a < m_mean {
            Self::A
        } else if m_b < m_mean {
            Self::B
        } else {
            Self::Mean
        }
    }
    /// Select the corresponding molality
    pub fn molality(&self, m_a: f64, m_b: f64, m_mean: f64) -> f64 {
        match self {
            Self::A => m_a,
            Self::B => m_b,
            Self::Mean => m_mean,
        }
    }
}

/// Molality controlling the wall reaction rate; see [`LimitingReagent`]
pub fn driving_molality(m_a: f64, m_b: f64, m_mean: f64) -> f64 {
    LimitingReagent::find(m_a, m_b, m_mean).molality(m_a, m_b, m_mean)
}

/// Smooth Hermite step, zero at `edge0`, one at `edge1` and clamped outside.
///
/// The first derivative is continuous. The edges may be given in descending order.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let x = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Degree to which a species drives the reaction; one if its molality equals the
/// driving molality, zero if it exceeds it by [`DRIVING_MOLALITY_SMOOTHING_GAP`] or more.
///
/// Differentiable replacement for the discrete choice in [`LimitingReagent::find`].
pub fn driving_molality_rate(molality: f64, driving_molality: f64) -> f64 {
    let excess = molality - driving_molality;
    smoothstep(DRIVING_MOLALITY_SMOOTHING_GAP, 0.0, excess)
}

/// Classical nucleation theory for the precipitate
///
/// # Examples
/// ~~~
/// use precipitation::Nucleation;
/// let barite = Nucleation::BARITE;
/// assert_eq!(barite.nucleation_rate(1.0, 298.15), 0.0);
/// assert!(barite.nucleation_rate(1e4, 298.15) > barite.nucleation_rate(1e3, 298.15));
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, Getters)]
#[serde(deny_unknown_fields)]
pub struct Nucleation {
    /// Molar mass of the precipitate in kg/mol
    #[validate(range(min = 1e-6))]
    molar_mass: f64,
    /// Interfacial tension, σ, in J/m²
    #[validate(range(min = 0.0))]
    surface_tension: f64,
    /// Contact angle, θ, with the wall in radians
    #[serde(default)]
    contact_angle: f64,
    /// Mass density of the crystal, ρ, in kg/m³
    #[validate(range(min = 1e-6))]
    density: f64,
    /// Pre-exponential factor, 𝐴ₙ, in 1/m³/s
    #[serde(default = "default_pre_exponential")]
    pre_exponential: f64,
}

const fn default_pre_exponential() -> f64 {
    1.0
}

impl Nucleation {
    /// Barium sulfate with σ = 40 mJ/m², θ = 10°, and ρ = 2710 kg/m³
    pub const BARITE: Nucleation =
        Nucleation::new(0.1000894, 40e-3, 10.0 / 180.0 * PI, 2710.0, 1.0);

    pub const fn new(
        molar_mass: f64,
        surface_tension: f64,
        contact_angle: f64,
        density: f64,
        pre_exponential: f64,
    ) -> Self {
        Self {
            molar_mass,
            surface_tension,
            contact_angle,
            density,
            pre_exponential,
        }
    }

    /// Molar volume of the crystal, 𝑉ₘ = 𝑀/ρ, in m³/mol
    pub fn molar_volume(&self) -> f64 {
        self.molar_mass / self.density
    }

    /// Contact angle function, (2 - 3cos θ + cos³θ)/8, reducing the barrier of
    /// heterogeneous nucleation
    pub fn contact_angle_factor(&self) -> f64 {
        let cos = self.contact_angle.cos();
        (2.0 - 3.0 * cos + cos.powi(3)) / 8.0
    }

    /// Nucleation rate, 𝐽 = 𝐴ₙ·exp(-16π𝑁ᴬ𝑉ₘ²σ³ / 3(𝑅𝑇)³(ln 𝑆)²), in 1/m³/s.
    ///
    /// Zero if the saturation ratio, 𝑆, is at or below [`NUCLEATION_THRESHOLD`].
    pub fn nucleation_rate(&self, saturation_ratio: f64, temperature: f64) -> f64 {
        if saturation_ratio <= NUCLEATION_THRESHOLD {
            return 0.0;
        }
        let numerator = 16.0
            * AVOGADRO_CONSTANT
            * PI
            * self.molar_volume().powi(2)
            * self.surface_tension.powi(3);
        let denominator =
            3.0 * (GAS_CONSTANT * temperature).powi(3) * saturation_ratio.ln().powi(2);
        self.pre_exponential * (-numerator / denominator).exp()
    }

    /// Critical nucleus radius, exp(-2𝑀σ / ρ𝑅𝑇·ln 𝑆).
    ///
    /// Zero if the saturation ratio is at or below [`NUCLEATION_THRESHOLD`].
    /// Note that this is the exponential of the classical radius, 2σ𝑉ₘ/𝑅𝑇·ln 𝑆, with
    /// flipped sign.
    pub fn critical_radius(&self, saturation_ratio: f64, temperature: f64) -> f64 {
        if saturation_ratio <= NUCLEATION_THRESHOLD {
            return 0.0;
        }
        let numerator = 2.0 * self.molar_mass * self.surface_tension;
        let denominator = self.density * GAS_CONSTANT * temperature * saturation_ratio.ln();
        (-numerator / denominator).exp()
    }

    /// Mass of precipitate produced by nucleation per volume and time in the bulk,
    /// (1 - 𝑘)·4π𝑟³/3·ρ·𝐽, where 𝑘 is the wall reaction ratio and 𝑟 the critical radius.
    pub fn bulk_reaction_rate(
        &self,
        wall: &WallLayer,
        saturation_ratio: f64,
        temperature: f64,
        wall_distance: f64,
    ) -> f64 {
        let rate = self.nucleation_rate(saturation_ratio, temperature);
        let radius = self.critical_radius(saturation_ratio, temperature);
        let volume = 4.0 / 3.0 * PI * radius.powi(3);
        (1.0 - wall.wall_reaction_ratio(wall_distance)) * volume * self.density * rate
    }
}

impl Display for Nucleation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nucleation: 𝑀 = {:.2} g/mol, σ = {:.1} mJ/m², θ = {:.1}°, ρ = {:.0} kg/m³, 𝐴ₙ = {:.2e}",
            self.molar_mass * 1e3,
            self.surface_tension * 1e3,
            self.contact_angle.to_degrees(),
            self.density,
            self.pre_exponential
        )
    }
}

/// Deposition rate at the wall in mol/kg
///
/// The saturation ratio is obtained from the saturation index as 𝑆 = SI¹⁰ and the rate is
/// 𝑘·(𝑆 - 1)/𝑆·𝑚, where 𝑘 is the wall reaction ratio and 𝑚 the [`driving_molality`].
/// Zero unless 𝑆 exceeds unity by more than [`SMALL`].
pub fn wall_reaction_rate_molality(
    wall: &WallLayer,
    molalities: &Molalities,
    saturation_index: f64,
    wall_distance: f64,
) -> f64 {
    let saturation_ratio = saturation_index.powi(10);
    if saturation_ratio - 1.0 < SMALL {
        return 0.0;
    }
    wall.wall_reaction_ratio(wall_distance) * (saturation_ratio - 1.0) / saturation_ratio
        * driving_molality(molalities.a, molalities.b, molalities.mean)
}
