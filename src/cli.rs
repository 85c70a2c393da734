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

//! Command line interface for evaluating scalar field functions over tabulated cells

use crate::registry::{self, Argument, Registrar, ScalarField};
use crate::{Config, SpeciesLabels};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use pretty_env_logger::env_logger::DEFAULT_FILTER_ENV;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{io::Write, path::PathBuf};

#[derive(Debug, Subcommand)]
enum Commands {
    /// List all scalar field functions and their arguments
    Functions {
        /// Input file in YAML format used for species labels
        #[clap(long, short = 'i')]
        input: Option<PathBuf>,
    },
    /// Evaluate scalar field functions over cells
    #[clap(arg_required_else_help = true)]
    Eval {
        /// Input file in YAML format
        #[clap(long, short = 'i')]
        input: PathBuf,
        /// Cell fields in YAML format
        #[clap(long, short = 'c')]
        cells: PathBuf,
        /// Function to evaluate; all applicable if omitted
        #[clap(long = "function", short = 'f')]
        functions: Vec<String>,
    },
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Verbose output. See more with e.g. RUST_LOG=Trace
    #[clap(long, short = 'v', action)]
    pub verbose: bool,
    /// Output file in YAML format
    #[clap(long, short = 'o', default_value = "output.yaml")]
    pub output: PathBuf,
}

/// Cell fields given as columns
///
/// Background mole fractions default to zero; the saturation index and wall
/// distance are needed only by the wall deposition functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellTable {
    pub temperature: Vec<f64>,
    pub y_a: Vec<f64>,
    pub y_b: Vec<f64>,
    #[serde(default)]
    pub y_etc1: Option<Vec<f64>>,
    #[serde(default)]
    pub y_etc2: Option<Vec<f64>>,
    #[serde(default)]
    pub saturation_index: Option<Vec<f64>>,
    #[serde(default)]
    pub wall_distance: Option<Vec<f64>>,
}

impl CellTable {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read cell file {:?}", path.as_ref()))?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }

    /// Column of a cell variable, if present
    fn column<'a>(&'a self, argument: Argument, zeros: &'a [f64]) -> Option<&'a [f64]> {
        match argument {
            Argument::Temperature => Some(&self.temperature),
            Argument::YA => Some(&self.y_a),
            Argument::YB => Some(&self.y_b),
            Argument::YEtc1 => Some(self.y_etc1.as_deref().unwrap_or(zeros)),
            Argument::YEtc2 => Some(self.y_etc2.as_deref().unwrap_or(zeros)),
            Argument::SaturationIndex => self.saturation_index.as_deref(),
            Argument::WallDistance => self.wall_distance.as_deref(),
        }
    }

    /// Inputs of a function in argument order or `None` if a column is missing
    pub fn inputs<'a>(&'a self, function: ScalarField, zeros: &'a [f64]) -> Option<Vec<&'a [f64]>> {
        function
            .arguments()
            .iter()
            .map(|argument| self.column(*argument, zeros))
            .collect()
    }
}

/// Evaluate functions over all cells.
///
/// If `functions` is empty, all functions for which the cell table has the
/// needed columns are evaluated.
pub fn evaluate(
    config: &Config,
    cells: &CellTable,
    functions: &[ScalarField],
) -> Result<BTreeMap<String, Vec<f64>>> {
    let engine = config.engine()?;
    let zeros = vec![0.0; cells.len()];
    let selected: Vec<ScalarField> = if functions.is_empty() {
        ScalarField::ALL
            .into_iter()
            .filter(|f| cells.inputs(*f, &zeros).is_some())
            .collect()
    } else {
        functions.to_vec()
    };

    let pb = ProgressBar::new(selected.len() as u64);
    let mut results = BTreeMap::new();
    for function in selected {
        let inputs = cells
            .inputs(function, &zeros)
            .ok_or_else(|| anyhow::anyhow!("Cell file lacks arguments of `{}`", function))?;
        let mut out = vec![0.0; cells.len()];
        function
            .evaluate(&engine, &mut out, &inputs)
            .with_context(|| format!("Could not evaluate `{}`", function))?;
        log::debug!("Evaluated {} over {} cells", function, cells.len());
        results.insert(function.name().to_owned(), out);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(results)
}

/// Logs function declarations
struct LogRegistrar;

impl Registrar for LogRegistrar {
    fn declare_function(&mut self, name: &str, category: &str) {
        log::info!("{} ({})", name, category);
    }
    fn declare_argument(
        &mut self,
        _function: &str,
        location: &str,
        variable: &str,
        byte_width: usize,
    ) {
        log::info!("  {}: {} ({} bytes)", location, variable, byte_width);
    }
}

/// Function names and argument variables
fn function_table(species: &SpeciesLabels) -> BTreeMap<String, Vec<String>> {
    ScalarField::ALL
        .iter()
        .map(|f| {
            let arguments = f.arguments().iter().map(|a| a.variable(species)).collect();
            (f.name().to_owned(), arguments)
        })
        .collect()
}

pub fn do_main() -> Result<()> {
    let args = Args::parse();
    if std::env::var(DEFAULT_FILTER_ENV).is_err() {
        std::env::set_var(
            DEFAULT_FILTER_ENV,
            if args.verbose { "Debug" } else { "Info" },
        );
    }
    pretty_env_logger::init();

    let mut yaml_output = std::fs::File::create(&args.output)
        .with_context(|| format!("Could not create output file {:?}", args.output))?;

    match args.command {
        Commands::Functions { input } => {
            let species = match input {
                Some(input) => Config::from_file(input)?.species().clone(),
                None => SpeciesLabels::default(),
            };
            registry::register_all(&mut LogRegistrar, &species);
            write_yaml(&function_table(&species), &mut yaml_output, Some("functions"))?;
        }
        Commands::Eval {
            input,
            cells,
            functions,
        } => {
            let config = Config::from_file(&input)?;
            let cells = CellTable::from_file(&cells)?;
            let functions = functions
                .iter()
                .map(|name| {
                    ScalarField::from_name(name)
                        .ok_or_else(|| anyhow::anyhow!("Unknown function `{}`", name))
                })
                .collect::<Result<Vec<_>>>()?;
            log::info!("Evaluating {} cells", cells.len());
            let results = evaluate(&config, &cells, &functions)?;
            write_yaml(&results, &mut yaml_output, None)?;
        }
    }
    Ok(())
}

/// Helper function to serialize data to an existing YAML file
fn write_yaml<T: serde::Serialize>(
    data: &T,
    output: &mut std::fs::File,
    key: Option<&str>,
) -> Result<()> {
    match key {
        Some(key) => {
            let mut wrapper = BTreeMap::new();
            wrapper.insert(key.to_string(), data);
            let yaml = serde_yaml::to_string(&wrapper)?;
            output.write_all(yaml.as_bytes())?;
        }
        None => {
            let yaml = serde_yaml::to_string(data)?;
            output.write_all(yaml.as_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellState, ReactionEngine};
    use float_cmp::assert_approx_eq;

    fn table() -> CellTable {
        serde_yaml::from_str(
            "
            temperature: [298.15, 320.0]
            y_a: [1.0e-5, 0.0]
            y_b: [2.0e-5, 1.0e-5]
            y_etc1: [1.0e-3, 1.0e-3]
            ",
        )
        .unwrap()
    }

    #[test]
    fn applicable_functions() {
        let cells = table();
        let results = evaluate(&Config::barite(), &cells, &[]).unwrap();
        // wall deposition needs saturation index and wall distance
        assert_eq!(results.len(), ScalarField::ALL.len() - 2);
        assert!(!results.contains_key("Wall Deposition (Molality)"));

        let engine = ReactionEngine::barite();
        let cell = CellState::new(298.15, 1e-5, 2e-5, 1e-3, 0.0);
        assert_approx_eq!(
            f64,
            results["Saturation Index"][0],
            engine.saturation_index(&cell)
        );
        // depleted cell
        assert_approx_eq!(f64, results["Saturation Index"][1], -16.0, epsilon = 1e-12);
    }

    #[test]
    fn selected_functions() {
        let mut cells = table();
        let functions = [ScalarField::WallReactionRateMoleFraction];
        assert!(evaluate(&Config::barite(), &cells, &functions).is_err());

        cells.saturation_index = Some(vec![1.5, 1.5]);
        cells.wall_distance = Some(vec![0.0, 0.0]);
        let results = evaluate(&Config::barite(), &cells, &functions).unwrap();
        assert_eq!(results.len(), 1);
        let rates = &results["Wall Deposition (Mole Fraction)"];
        assert!(rates[0] > 0.0);
        // no A, no deposition
        assert_eq!(rates[1], 0.0);
    }

    #[test]
    fn mismatched_columns() {
        let mut cells = table();
        cells.y_b.push(0.0);
        assert!(evaluate(&Config::barite(), &cells, &[ScalarField::MeanMolality]).is_err());
    }

    #[test]
    fn functions_listing() {
        let table = function_table(&SpeciesLabels::default());
        assert_eq!(table.len(), ScalarField::ALL.len());
        assert_eq!(table["Ionic Strength"], ["$yEtc_1-", "$yEtc_2-"]);
    }
}
