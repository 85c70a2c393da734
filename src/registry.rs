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

//! # Registration of scalar field functions with a host solver
//!
//! A host computational fluid dynamics solver calls element-wise functions of the
//! form `f(out[N], in₁[N], in₂[N], ...)`, where each input is a cell variable.
//! This module names the functions, declares their arguments through a
//! [`Registrar`], and dispatches evaluation to a [`ReactionEngine`].

use crate::{CellFields, ReactionEngine, SpeciesLabels};
use core::fmt::{self, Display, Formatter};
use std::mem::size_of;

/// Category under which all functions are registered
pub const CATEGORY: &str = "ScalarFieldFunction";

/// Location of all arguments
pub const LOCATION: &str = "Cell";

/// Host side function and argument declarations
pub trait Registrar {
    /// Declare a function with a display name
    fn declare_function(&mut self, name: &str, category: &str);
    /// Declare the next argument of a previously declared function
    fn declare_argument(
        &mut self,
        function: &str,
        location: &str,
        variable: &str,
        byte_width: usize,
    );
}

/// Cell variable entering a scalar field function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    Temperature,
    /// Mole fraction of reacting ion A
    YA,
    /// Mole fraction of reacting ion B
    YB,
    /// Mole fraction of the first background ion
    YEtc1,
    /// Mole fraction of the second background ion
    YEtc2,
    SaturationIndex,
    WallDistance,
}

impl Argument {
    /// Name of the cell variable in the host solver
    pub fn variable(&self, species: &SpeciesLabels) -> String {
        match self {
            Self::Temperature => "Temperature".to_owned(),
            Self::YA => format!("$y{}", species.a()),
            Self::YB => format!("$y{}", species.b()),
            Self::YEtc1 => format!("$y{}", species.etc1()),
            Self::YEtc2 => format!("$y{}", species.etc2()),
            Self::SaturationIndex => "$SaturationIndex".to_owned(),
            Self::WallDistance => "$WallDistance".to_owned(),
        }
    }
}

const CELL: [Argument; 5] = [
    Argument::Temperature,
    Argument::YA,
    Argument::YB,
    Argument::YEtc1,
    Argument::YEtc2,
];

const CELL_AND_WALL: [Argument; 7] = [
    Argument::Temperature,
    Argument::YA,
    Argument::YB,
    Argument::YEtc1,
    Argument::YEtc2,
    Argument::SaturationIndex,
    Argument::WallDistance,
];

/// Functions exposed to the host solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    EquilibriumConstant,
    ActivityCoefficient,
    SaturationIndex,
    IonicStrength,
    MeanMolality,
    WallReactionRateMolality,
    WallReactionRateMoleFraction,
    NucleationRate,
    WallConcentrationA,
    WallConcentrationB,
}

impl ScalarField {
    /// All functions in registration order
    pub const ALL: [ScalarField; 10] = [
        Self::EquilibriumConstant,
        Self::ActivityCoefficient,
        Self::SaturationIndex,
        Self::IonicStrength,
        Self::MeanMolality,
        Self::WallReactionRateMolality,
        Self::WallReactionRateMoleFraction,
        Self::NucleationRate,
        Self::WallConcentrationA,
        Self::WallConcentrationB,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::EquilibriumConstant => "Equilibrium Constant",
            Self::ActivityCoefficient => "Activity Coefficient",
            Self::SaturationIndex => "Saturation Index",
            Self::IonicStrength => "Ionic Strength",
            Self::MeanMolality => "Mean Molality",
            Self::WallReactionRateMolality => "Wall Deposition (Molality)",
            Self::WallReactionRateMoleFraction => "Wall Deposition (Mole Fraction)",
            Self::NucleationRate => "Nucleation Rate",
            Self::WallConcentrationA => "Wall Concentration A",
            Self::WallConcentrationB => "Wall Concentration B",
        }
    }

    /// Find function by display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Arguments in the order they are passed to [`ScalarField::evaluate`]
    pub fn arguments(&self) -> &'static [Argument] {
        match self {
            Self::EquilibriumConstant => &CELL[..1],
            Self::IonicStrength => &CELL[3..],
            Self::MeanMolality => &CELL[1..],
            Self::ActivityCoefficient
            | Self::SaturationIndex
            | Self::NucleationRate
            | Self::WallConcentrationA
            | Self::WallConcentrationB => &CELL,
            Self::WallReactionRateMolality | Self::WallReactionRateMoleFraction => &CELL_AND_WALL,
        }
    }

    /// Declare the function and its arguments
    pub fn register(&self, registrar: &mut impl Registrar, species: &SpeciesLabels) {
        registrar.declare_function(self.name(), CATEGORY);
        for argument in self.arguments() {
            registrar.declare_argument(
                self.name(),
                LOCATION,
                &argument.variable(species),
                size_of::<f64>(),
            );
        }
    }

    /// Evaluate element-wise with `inputs` ordered as in [`ScalarField::arguments`]
    ///
    /// # Examples
    /// ~~~
    /// use precipitation::{registry::ScalarField, ReactionEngine};
    /// let engine = ReactionEngine::barite();
    /// let mut out = [0.0; 2];
    /// ScalarField::IonicStrength
    ///     .evaluate(&engine, &mut out, &[&[0.0, 0.01], &[0.0, 0.0]])
    ///     .unwrap();
    /// assert_eq!(out[0], 1e-18);
    /// assert!(out[1] > 0.0);
    /// ~~~
    pub fn evaluate(
        &self,
        engine: &ReactionEngine,
        out: &mut [f64],
        inputs: &[&[f64]],
    ) -> anyhow::Result<()> {
        let expected = self.arguments().len();
        if inputs.len() != expected {
            anyhow::bail!(
                "{} takes {} arguments but {} were given",
                self.name(),
                expected,
                inputs.len()
            );
        }
        let cells = || cell_fields(self.arguments(), inputs);
        match self {
            Self::EquilibriumConstant => engine.equilibria(out, inputs[0]),
            Self::ActivityCoefficient => engine.activity_coefficients(out, &cells()?),
            Self::SaturationIndex => engine.saturation_indices(out, &cells()?),
            Self::IonicStrength => engine.ionic_strengths(out, &cells()?),
            Self::MeanMolality => engine.mean_molalities(out, &cells()?),
            Self::WallReactionRateMolality => {
                engine.wall_reaction_rates_molality(out, &cells()?, inputs[5], inputs[6])
            }
            Self::WallReactionRateMoleFraction => {
                engine.wall_reaction_rates_mole_fraction(out, &cells()?, inputs[5], inputs[6])
            }
            Self::NucleationRate => {
                engine.nucleation_rates(out, &cells()?, ReactionEngine::saturation_index)
            }
            Self::WallConcentrationA => engine.wall_concentrations_a(out, &cells()?),
            Self::WallConcentrationB => engine.wall_concentrations_b(out, &cells()?),
        }
    }
}

/// Cell fields from inputs ordered as `arguments`.
///
/// Fields not among the arguments are never read and are filled with the first input.
fn cell_fields<'a>(arguments: &[Argument], inputs: &[&'a [f64]]) -> anyhow::Result<CellFields<'a>> {
    let field = |argument: Argument| {
        arguments
            .iter()
            .position(|a| *a == argument)
            .map_or(inputs[0], |i| inputs[i])
    };
    CellFields::new(
        field(Argument::Temperature),
        field(Argument::YA),
        field(Argument::YB),
        field(Argument::YEtc1),
        field(Argument::YEtc2),
    )
}

impl Display for ScalarField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Register all functions with a host solver
pub fn register_all(registrar: &mut impl Registrar, species: &SpeciesLabels) {
    for function in ScalarField::ALL {
        function.register(registrar, species);
        log::debug!("Registered {}", function);
    }
}
