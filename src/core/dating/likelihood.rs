//! Per-edge likelihood of an age difference, from mutations and recombination.
use super::Topology;
use crate::core::params::DatingParams;
use crate::io::trees::TreeSequence;

/// Attach each mutation to the edge directly above its node at the mutation's site.
/// Returns the mutation count of every edge and the carrying edge of every mutation
/// (`None` for mutations above a root).
pub fn assign_mutations(
    ts: &TreeSequence,
    topology: &Topology,
) -> (Vec<usize>, Vec<Option<usize>>) {
    let mut counts = vec![0usize; ts.edges.len()];
    let carriers = ts
        .mutations
        .iter()
        .map(|mutation| {
            let position = ts.sites[mutation.site].position;
            let edge = topology.parent_edges[mutation.node]
                .iter()
                .copied()
                .find(|&e| ts.edges[e].covers(position));
            if let Some(e) = edge {
                counts[e] += 1;
            }
            edge
        })
        .collect();
    (counts, carriers)
}

/// Poisson likelihood of the mutations (and absence of recombination) on one edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLikelihood {
    mutation_scale: Option<f64>,
    recombination_scale: Option<f64>,
    mutations: f64,
    log_peak: f64,
}

impl EdgeLikelihood {
    pub fn new(span: f64, mutations: usize, params: &DatingParams) -> Self {
        let mutation_scale = params.mutation_rate.map(|mu| mu * span);
        let recombination_scale = params.recombination_rate.map(|rho| rho * span);
        let mutations = mutations as f64;

        // Maximum of the unnormalised log likelihood over dt > 0
        let log_peak = match mutation_scale {
            Some(a) if mutations > 0.0 => {
                let b = recombination_scale.unwrap_or(0.0);
                mutations * (a * mutations / (a + b)).ln() - mutations
            }
            _ => 0.0,
        };

        Self {
            mutation_scale,
            recombination_scale,
            mutations,
            log_peak,
        }
    }

    /// Log likelihood of an age difference of `dt` generations, shifted so the maximum is 0
    pub fn log_value(&self, dt: f64) -> f64 {
        if dt <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let mut ll = 0.0;
        if let Some(a) = self.mutation_scale {
            let lambda = a * dt;
            if self.mutations > 0.0 {
                ll += self.mutations * lambda.ln();
            }
            ll -= lambda;
        }
        if let Some(b) = self.recombination_scale {
            ll -= b * dt;
        }
        ll - self.log_peak
    }

    pub fn value(&self, dt: f64) -> f64 {
        self.log_value(dt).exp()
    }
}
