//! Coalescent-style age priors for non-sample nodes.
use std::collections::BTreeMap;

use ndarray::Array2;
use tracing::debug;

use super::Topology;
use super::grid::interval_widths;
use crate::io::trees::TreeSequence;

/// Shape of the gamma distribution approximating a node's age
const PRIOR_SHAPE: f64 = 2.0;

/// Number of distinct samples below each node, counted over all of its edges
pub fn descendant_sample_counts(ts: &TreeSequence, topology: &Topology) -> Vec<usize> {
    let samples = ts.samples();
    let words = samples.len().div_ceil(64).max(1);
    let mut below = vec![vec![0u64; words]; ts.nodes.len()];
    for (bit, &node) in samples.iter().enumerate() {
        below[node][bit / 64] |= 1u64 << (bit % 64);
    }

    for &node in &topology.order {
        for &edge in &topology.child_edges[node] {
            let child = ts.edges[edge].child;
            for w in 0..words {
                let bits = below[child][w];
                below[node][w] |= bits;
            }
        }
    }

    below
        .iter()
        .map(|set| set.iter().map(|w| w.count_ones() as usize).sum())
        .collect()
}

/// Expected age, in generations, of a node ancestral to `k` samples
pub fn expected_age(k: usize, population_size: f64) -> f64 {
    let k = k.max(2) as f64;
    2.0 * (1.0 - 1.0 / k) * 2.0 * population_size
}

/// Gamma prior discretised on `grid`. The present (t = 0) gets no mass.
pub fn discretised_prior(grid: &[f64], widths: &[f64], mean: f64) -> Vec<f64> {
    let theta = mean / PRIOR_SHAPE;
    let mut mass: Vec<f64> = grid
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (&t, &w))| {
            if i == 0 || t <= 0.0 {
                0.0
            } else {
                t.powf(PRIOR_SHAPE - 1.0) * (-t / theta).exp() * w
            }
        })
        .collect();

    let total: f64 = mass.iter().sum();
    if total > 0.0 && total.is_finite() {
        mass.iter_mut().for_each(|m| *m /= total);
    } else {
        let uniform = 1.0 / (grid.len() - 1) as f64;
        mass.iter_mut().skip(1).for_each(|m| *m = uniform);
    }
    mass
}

/// Prior for every node (rows) over the grid (columns). Fixed nodes get an all-zero row.
pub fn node_priors(
    grid: &[f64],
    counts: &[usize],
    fixed: &[Option<usize>],
    population_size: f64,
) -> Array2<f64> {
    let widths = interval_widths(grid);
    let mut priors = Array2::<f64>::zeros((counts.len(), grid.len()));
    let mut cache: BTreeMap<usize, Vec<f64>> = BTreeMap::new();

    for (node, &k) in counts.iter().enumerate() {
        if fixed[node].is_some() {
            continue;
        }
        let row = cache.entry(k.max(2)).or_insert_with(|| {
            discretised_prior(grid, &widths, expected_age(k, population_size))
        });
        for (dst, &src) in priors.row_mut(node).iter_mut().zip(row.iter()) {
            *dst = src;
        }
    }

    debug!("Built priors for {} distinct descendant counts", cache.len());
    priors
}
