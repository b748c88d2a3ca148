//! Node age estimation on a discrete time grid.
//!
//! `date` validates the model parameters, builds the time grid and per-node
//! priors, attaches mutations to edges, runs the inside/outside passes and
//! turns posterior means into a consistent set of node and mutation ages.
pub mod constrain;
pub mod grid;
pub mod inside_outside;
pub mod likelihood;
pub mod prior;

use thiserror::Error;
use tracing::{debug, info};

use crate::core::params::DatingParams;
use crate::io::provenance::dating_record;
use crate::io::trees::{TreeSequence, TreesError};
use likelihood::EdgeLikelihood;

/// Errors raised when node ages cannot be estimated for the given input and parameters
#[derive(Debug, Error)]
pub enum DatingError {
    #[error("population size (Ne) must be positive, got {0}")]
    PopulationSize(f64),
    #[error("mutation rate must be positive, got {0}")]
    MutationRate(f64),
    #[error("recombination rate must be positive, got {0}")]
    RecombinationRate(f64),
    #[error("at least 2 time slices are required, got {0}")]
    Slices(usize),
    #[error("epsilon must be positive, got {0}")]
    Epsilon(f64),
    #[error("tree sequence has no sample nodes")]
    NoSamples,
    #[error("node {0} has no probability on the time grid")]
    Degenerate(usize),
    #[error("dated tree sequence is inconsistent: {0}")]
    Inconsistent(#[from] TreesError),
}

fn positive(x: f64) -> bool {
    x > 0.0 && x.is_finite()
}

/// Reject parameter combinations the model cannot work with
pub fn validate_params(params: &DatingParams) -> Result<(), DatingError> {
    if !positive(params.population_size)
        || !(2.0 * params.population_size * grid::UNIFORM_SPAN).is_finite()
    {
        return Err(DatingError::PopulationSize(params.population_size));
    }
    if let Some(mu) = params.mutation_rate {
        if !positive(mu) {
            return Err(DatingError::MutationRate(mu));
        }
    }
    if let Some(rho) = params.recombination_rate {
        if !positive(rho) {
            return Err(DatingError::RecombinationRate(rho));
        }
    }
    if params.slices < 2 {
        return Err(DatingError::Slices(params.slices));
    }
    if !positive(params.epsilon) {
        return Err(DatingError::Epsilon(params.epsilon));
    }
    Ok(())
}

/// Edge adjacency of a tree sequence, with nodes in an order where every
/// child precedes its parents (ascending input time).
#[derive(Debug, Clone)]
pub struct Topology {
    pub order: Vec<usize>,
    /// Edges in which the node is the parent
    pub child_edges: Vec<Vec<usize>>,
    /// Edges in which the node is the child
    pub parent_edges: Vec<Vec<usize>>,
}

impl Topology {
    pub fn new(ts: &TreeSequence) -> Self {
        let num_nodes = ts.nodes.len();
        let mut order: Vec<usize> = (0..num_nodes).collect();
        order.sort_by(|&a, &b| ts.nodes[a].time.total_cmp(&ts.nodes[b].time).then(a.cmp(&b)));

        let mut child_edges = vec![Vec::new(); num_nodes];
        let mut parent_edges = vec![Vec::new(); num_nodes];
        for (id, edge) in ts.edges.iter().enumerate() {
            child_edges[edge.parent].push(id);
            parent_edges[edge.child].push(id);
        }

        Self {
            order,
            child_edges,
            parent_edges,
        }
    }
}

/// Estimate the age of every non-sample node and every mutation.
/// Sample nodes keep their ages; the returned tree sequence carries an extra
/// provenance record.
pub fn date(ts: &TreeSequence, params: &DatingParams) -> Result<TreeSequence, DatingError> {
    validate_params(params)?;
    if ts.num_samples() == 0 {
        return Err(DatingError::NoSamples);
    }

    let topology = Topology::new(ts);
    let sample_times = ts.nodes.iter().filter(|n| n.is_sample()).map(|n| n.time);
    let grid = grid::with_fixed_times(
        grid::build_time_grid(params.time_grid, params.slices, params.population_size),
        sample_times,
    );
    let fixed: Vec<Option<usize>> = ts
        .nodes
        .iter()
        .map(|n| n.is_sample().then(|| grid::nearest_index(&grid, n.time)))
        .collect();

    info!(
        "Dating {} nodes ({} samples) over {} edges on a {}-point {} grid",
        ts.nodes.len(),
        ts.num_samples(),
        ts.edges.len(),
        grid.len(),
        params.time_grid
    );

    let counts = prior::descendant_sample_counts(ts, &topology);
    let priors = prior::node_priors(&grid, &counts, &fixed, params.population_size);

    let (edge_mutations, carriers) = likelihood::assign_mutations(ts, &topology);
    debug!(
        "{} of {} mutations placed on edges",
        carriers.iter().filter(|c| c.is_some()).count(),
        ts.mutations.len()
    );
    let likelihoods: Vec<EdgeLikelihood> = ts
        .edges
        .iter()
        .zip(&edge_mutations)
        .map(|(edge, &m)| EdgeLikelihood::new(edge.span(), m, params))
        .collect();

    let mut times =
        inside_outside::posterior_mean_times(ts, &topology, &grid, &priors, &likelihoods, &fixed)?;
    constrain::constrain_ages(&mut times, ts, &topology, params.epsilon);

    let mut dated = ts.clone();
    for (node, &time) in dated.nodes.iter_mut().zip(&times) {
        node.time = time;
    }
    for (mutation, carrier) in dated.mutations.iter_mut().zip(&carriers) {
        mutation.time = Some(match carrier {
            Some(e) => {
                let edge = &ts.edges[*e];
                0.5 * (times[edge.child] + times[edge.parent])
            }
            None => times[mutation.node],
        });
    }
    dated.provenances.push(dating_record(params));
    dated.validate()?;

    Ok(dated)
}
