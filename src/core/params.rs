use serde::{Deserialize, Serialize};

use crate::types::TimeGrid;

/// Model parameters consumed by the dating engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatingParams {
    /// Effective population size (Ne)
    pub population_size: f64,
    pub time_grid: TimeGrid,
    /// Per base, per generation. None disables the mutation likelihood
    pub mutation_rate: Option<f64>,
    /// Per base, per generation. None disables the recombination likelihood
    pub recombination_rate: Option<f64>,
    /// Number of points in the time grid
    pub slices: usize,
    /// Minimum age gap enforced between a parent and its children, in generations
    pub epsilon: f64,
}

impl Default for DatingParams {
    fn default() -> Self {
        Self {
            population_size: 10000.0,
            time_grid: TimeGrid::Adaptive,
            mutation_rate: None,
            recombination_rate: None,
            slices: 50,
            epsilon: 1e-6,
        }
    }
}
