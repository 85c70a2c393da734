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

//! # Thermodynamics and kinetics of binary ionic precipitation
//!
//! This library evaluates the saturation state and crystallization kinetics of a
//! single precipitation reaction, A + B ⇌ P(s), such as barite formation,
//! Ba²⁺ + SO₄²⁻ ⇌ BaSO₄(s), from the local state of a computational cell:
//! temperature and the mole fractions of the reacting ions and of up to two
//! inert background ions.
//!
//! The results are intended as source terms and diagnostic fields for a host
//! transport solver:
//!
//! - [Ionic strength](https://en.wikipedia.org/wiki/Ionic_strength) and mean molality
//! - Temperature dependent equilibrium constant, see [`equilibrium`]
//! - Mean ionic activity coefficient, see [`activity`]
//! - Saturation rate and index
//! - Nucleation rate and wall deposition rate, see [`nucleation`]
//!
//! Everything is composed in a [`ReactionEngine`] which is evaluated either per cell
//! or element-wise over slices of cell fields.
//!
//! ## Example
//!
//! ~~~
//! use precipitation::{CellState, Config};
//! let engine = Config::barite().engine().unwrap();
//! let cell = CellState::new(298.15, 1e-5, 1e-5, 0.0, 0.0);
//! let si = engine.saturation_index(&cell);
//! assert!(si.is_finite() && si > 0.0); // supersaturated
//! ~~~

pub mod activity;
pub mod cli;
mod config;
mod engine;
pub mod equilibrium;
pub mod nucleation;
mod reaction;
pub mod registry;
mod solvent;

pub use activity::ActivityModel;
pub use config::{Config, SpeciesLabels};
pub use engine::{CellFields, ReactionEngine};
pub use equilibrium::EquilibriumFormulation;
pub use nucleation::{Nucleation, WallLayer};
pub use reaction::{ionic_strength, CellState, Molalities, Reaction};
pub use solvent::{EmpiricalPermittivity, Permittivity, Solvent};

pub use physical_constants::{
    AVOGADRO_CONSTANT, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY,
};

/// Numerical floor used for concentrations and as the under-saturated saturation rate
pub const SMALL: f64 = 1e-16;

/// Lower bound of the ionic strength (mol/kg)
pub const MIN_IONIC_STRENGTH: f64 = 1e-18;

/// Molar gas constant, 𝑅 = 𝑁ᴬ·𝑘ᴮ (J/mol/K)
pub const GAS_CONSTANT: f64 = AVOGADRO_CONSTANT * BOLTZMANN_CONSTANT;

/// Standard reference temperature, 25 °C (K)
pub const STANDARD_TEMPERATURE: f64 = 298.15;

/// Joule per (international table) kilocalorie
pub const JOULE_PER_KILOCALORIE: f64 = 4186.8;
