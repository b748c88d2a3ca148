//! Shared types and enums used across tsdate.
//! Currently the `TimeGrid` discretisation strategy.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Strategy used to place the candidate node ages the dating engine works on.
#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrid {
    /// Quantiles of the coalescent prior: dense near the present, sparse in the past
    #[default]
    Adaptive,
    /// Evenly spaced points up to a fixed multiple of 2Ne generations
    Uniform,
}

impl TimeGrid {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGrid::Adaptive => "adaptive",
            TimeGrid::Uniform => "uniform",
        }
    }
}

impl std::fmt::Display for TimeGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
