use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Command, CommandFactory, FromArgMatches, Parser};

use crate::core::params::DatingParams;
use crate::types::TimeGrid;

/// Program name reported in usage and version output
pub const BIN_NAME: &str = "tsdate";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "tsdate",
    version,
    about = "Estimate the ages of nodes in a tree sequence",
    long_about = "Estimate the ages of nodes in a tree sequence.\n\n\
                  The output file is only trustworthy once tsdate has exited with status 0."
)]
pub struct CliArgs {
    /// Input tree sequence whose node ages are estimated
    pub ts: PathBuf,

    /// Output path for the dated tree sequence (overwritten on success)
    pub output: PathBuf,

    /// Effective population size
    #[arg(short = 'n', long = "Ne", default_value_t = 10000.0, allow_hyphen_values = true)]
    pub ne: f64,

    /// How candidate node ages are placed in time
    #[arg(short = 'g', long, value_enum, default_value_t = TimeGrid::Adaptive)]
    pub time_grid: TimeGrid,

    /// Mutation rate per base per generation
    #[arg(short = 'm', long, allow_hyphen_values = true)]
    pub mutation_rate: Option<f64>,

    /// Recombination rate per base per generation
    #[arg(short = 'r', long, allow_hyphen_values = true)]
    pub recombination_rate: Option<f64>,

    /// Number of points in the time grid
    #[arg(short = 's', long, default_value_t = 50)]
    pub slices: usize,

    /// Minimum age difference between a node and its children, in generations
    #[arg(short = 'e', long, default_value_t = 1e-6, allow_hyphen_values = true)]
    pub epsilon: f64,

    /// Log progress to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbosity: u8,
}

impl CliArgs {
    /// Model parameters for the dating engine
    pub fn params(&self) -> DatingParams {
        DatingParams {
            population_size: self.ne,
            time_grid: self.time_grid,
            mutation_rate: self.mutation_rate,
            recombination_rate: self.recombination_rate,
            slices: self.slices,
            epsilon: self.epsilon,
        }
    }
}

/// A fresh parser carrying every option definition
pub fn build_parser() -> Command {
    CliArgs::command()
}

/// Parse `tokens` (without the program name) into a configuration record
pub fn parse<I, T>(parser: &Command, tokens: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv = std::iter::once(OsString::from(BIN_NAME)).chain(tokens.into_iter().map(Into::into));
    let matches = parser.clone().try_get_matches_from(argv)?;
    CliArgs::from_arg_matches(&matches)
}
