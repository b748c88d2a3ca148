//! Inside/outside message passing over the discretised genealogy.
//!
//! The inside pass runs from the youngest node to the oldest and combines each
//! node's prior with upward messages from its children. The outside pass runs
//! back down, sending each child the information carried by its parents and
//! their other children. A free node's posterior on the grid is the product of
//! its inside and outside vectors; fixed nodes (samples) sit on a single grid
//! point and only act as boundary conditions.
//!
//! The genealogy of a tree sequence is a DAG, not a tree, so the posterior is
//! the usual loopy belief propagation approximation.
use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

use super::likelihood::EdgeLikelihood;
use super::{DatingError, Topology};
use crate::io::trees::TreeSequence;

/// Scale `v` so its largest entry is 1. Returns false if `v` carries no mass.
fn rescale_max(mut v: ndarray::ArrayViewMut1<f64>) -> bool {
    let max = v.iter().copied().fold(0.0_f64, f64::max);
    if !(max > 0.0 && max.is_finite()) {
        return false;
    }
    v.mapv_inplace(|x| x / max);
    true
}

/// Exponentiate a vector of logs after shifting its maximum to 0.
/// Entries at `-inf` become exactly 0; an all `-inf` vector stays all zero.
fn exp_rescaled(log: &Array1<f64>) -> Array1<f64> {
    let max = log.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return Array1::zeros(log.len());
    }
    log.mapv(|x| (x - max).exp())
}

/// Streaming log-sum-exp accumulator
#[derive(Clone, Copy)]
struct LogSum {
    max: f64,
    scaled: f64,
}

impl LogSum {
    fn new() -> Self {
        Self {
            max: f64::NEG_INFINITY,
            scaled: 0.0,
        }
    }

    fn add(&mut self, x: f64) {
        if x == f64::NEG_INFINITY {
            return;
        }
        if x > self.max {
            self.scaled = self.scaled * (self.max - x).exp() + 1.0;
            self.max = x;
        } else {
            self.scaled += (x - self.max).exp();
        }
    }

    fn value(&self) -> f64 {
        if self.scaled > 0.0 {
            self.max + self.scaled.ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

fn delta(len: usize, index: usize) -> Array1<f64> {
    let mut v = Array1::zeros(len);
    v[index] = 1.0;
    v
}

/// Message from a child to its parent: `up(i) = sum_{j < i} L(t_i - t_j) inside_child(j)`,
/// summed in log space and scaled so its largest entry is 1
fn upward(grid: &[f64], lik: &EdgeLikelihood, child_inside: ArrayView1<f64>) -> Array1<f64> {
    let k = grid.len();
    let mut log_msg = Array1::from_elem(k, f64::NEG_INFINITY);
    for i in 1..k {
        let mut acc = LogSum::new();
        for j in 0..i {
            let w = child_inside[j];
            if w > 0.0 {
                acc.add(lik.log_value(grid[i] - grid[j]) + w.ln());
            }
        }
        log_msg[i] = acc.value();
    }
    exp_rescaled(&log_msg)
}

/// Message from a parent to its child: `down(j) = sum_{i > j} L(t_i - t_j) weight(i)`,
/// summed in log space and scaled so its largest entry is 1
fn downward(grid: &[f64], lik: &EdgeLikelihood, parent_weight: ArrayView1<f64>) -> Array1<f64> {
    let k = grid.len();
    let mut log_msg = Array1::from_elem(k, f64::NEG_INFINITY);
    for j in 0..k {
        let mut acc = LogSum::new();
        for i in (j + 1)..k {
            let w = parent_weight[i];
            if w > 0.0 {
                acc.add(lik.log_value(grid[i] - grid[j]) + w.ln());
            }
        }
        log_msg[j] = acc.value();
    }
    exp_rescaled(&log_msg)
}

/// Run both passes and return the posterior mean age of every node.
/// Fixed nodes keep their input time.
pub fn posterior_mean_times(
    ts: &TreeSequence,
    topology: &Topology,
    grid: &[f64],
    priors: &Array2<f64>,
    likelihoods: &[EdgeLikelihood],
    fixed: &[Option<usize>],
) -> Result<Vec<f64>, DatingError> {
    let num_nodes = ts.nodes.len();
    let k = grid.len();
    let mut inside = Array2::<f64>::zeros((num_nodes, k));
    let mut outside = Array2::<f64>::ones((num_nodes, k));
    let mut up = Array2::<f64>::zeros((ts.edges.len(), k));

    // Inside: children before parents. Products are taken in log space.
    for &node in &topology.order {
        let mut log_row = match fixed[node] {
            Some(index) => delta(k, index).mapv(f64::ln),
            None => priors.row(node).mapv(f64::ln),
        };

        for &e in &topology.child_edges[node] {
            let child = ts.edges[e].child;
            let mut msg = upward(grid, &likelihoods[e], inside.row(child));
            if !rescale_max(msg.view_mut()) && fixed[node].is_none() {
                return Err(DatingError::Degenerate(node));
            }
            if fixed[node].is_none() {
                log_row += &msg.mapv(f64::ln);
            }
            up.row_mut(e).assign(&msg);
        }

        let mut row = exp_rescaled(&log_row);
        let total = row.sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(DatingError::Degenerate(node));
        }
        row /= total;
        inside.row_mut(node).assign(&row);
    }

    // Outside: parents before children
    for &node in topology.order.iter().rev() {
        if fixed[node].is_some() || topology.parent_edges[node].is_empty() {
            continue;
        }
        let mut log_acc = Array1::<f64>::zeros(k);
        for &e in &topology.parent_edges[node] {
            let parent = ts.edges[e].parent;
            let weight = match fixed[parent] {
                Some(index) => delta(k, index),
                None => {
                    // Parent belief with this edge's own contribution divided out
                    let mut w = Array1::zeros(k);
                    for i in 0..k {
                        let m = up[[e, i]];
                        if m > 0.0 {
                            w[i] = inside[[parent, i]] / m * outside[[parent, i]];
                        }
                    }
                    w
                }
            };
            let mut msg = downward(grid, &likelihoods[e], weight.view());
            if !rescale_max(msg.view_mut()) {
                return Err(DatingError::Degenerate(node));
            }
            log_acc += &msg.mapv(f64::ln);
        }
        let mut acc = exp_rescaled(&log_acc);
        if !rescale_max(acc.view_mut()) {
            return Err(DatingError::Degenerate(node));
        }
        outside.row_mut(node).assign(&acc);
    }

    let mut times = Vec::with_capacity(num_nodes);
    for (node, meta) in ts.nodes.iter().enumerate() {
        if fixed[node].is_some() {
            times.push(meta.time);
            continue;
        }
        let posterior = &inside.row(node) * &outside.row(node);
        let total = posterior.sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(DatingError::Degenerate(node));
        }
        let mean = posterior
            .iter()
            .zip(grid)
            .map(|(p, t)| p * t)
            .sum::<f64>()
            / total;
        times.push(mean);
    }

    debug!(
        "Computed posteriors for {} nodes on a {}-point grid",
        num_nodes, k
    );
    Ok(times)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upward_only_reaches_older_points() {
        let grid = [0.0, 1.0, 2.0];
        let lik = EdgeLikelihood::new(1.0, 0, &crate::DatingParams::default());
        let child = ndarray::arr1(&[0.0, 1.0, 0.0]);
        let msg = upward(&grid, &lik, child.view());
        assert_eq!(msg.to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_downward_only_reaches_younger_points() {
        let grid = [0.0, 1.0, 2.0];
        let lik = EdgeLikelihood::new(1.0, 0, &crate::DatingParams::default());
        let parent = ndarray::arr1(&[0.0, 1.0, 0.0]);
        let msg = downward(&grid, &lik, parent.view());
        assert_eq!(msg.to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_messages_survive_likelihood_peaks_beyond_the_grid() {
        // 400 mutations at 1e-6 per generation peak at dt = 4e8, far past the grid
        let params = crate::DatingParams {
            mutation_rate: Some(1e-6),
            ..crate::DatingParams::default()
        };
        let lik = EdgeLikelihood::new(1.0, 400, &params);
        assert_eq!(lik.value(2.0), 0.0);

        let grid = [0.0, 1.0, 2.0];
        let child = ndarray::arr1(&[1.0, 0.0, 0.0]);
        let msg = upward(&grid, &lik, child.view());
        assert_eq!(msg[0], 0.0);
        assert_eq!(msg[2], 1.0);
        assert!(msg[1] > 0.0 && msg[1] < msg[2]);

        let parent = ndarray::arr1(&[0.0, 0.0, 1.0]);
        let msg = downward(&grid, &lik, parent.view());
        assert_eq!(msg[0], 1.0);
        assert!(msg[1] > 0.0 && msg[1] < 1.0);
        assert_eq!(msg[2], 0.0);
    }

    #[test]
    fn test_log_sum_matches_direct_sum() {
        let mut acc = LogSum::new();
        assert_eq!(acc.value(), f64::NEG_INFINITY);
        for x in [1.0_f64, 2.0, 3.0] {
            acc.add(x.ln());
        }
        acc.add(f64::NEG_INFINITY);
        assert!((acc.value() - 6.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_rescale_rejects_empty_vectors() {
        let mut zeros = Array1::<f64>::zeros(3);
        assert!(!rescale_max(zeros.view_mut()));

        let mut v = ndarray::arr1(&[1.0, 4.0, 2.0]);
        assert!(rescale_max(v.view_mut()));
        assert_eq!(v.to_vec(), vec![0.25, 1.0, 0.5]);
    }
}
