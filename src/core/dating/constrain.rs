use super::Topology;
use crate::io::trees::TreeSequence;

/// Push every non-sample node to at least `epsilon` above each of its children.
/// Nodes are visited youngest first, so children are final before their parents.
pub fn constrain_ages(times: &mut [f64], ts: &TreeSequence, topology: &Topology, epsilon: f64) {
    for &node in &topology.order {
        if ts.nodes[node].is_sample() {
            continue;
        }
        let floor = topology.child_edges[node]
            .iter()
            .map(|&e| times[ts.edges[e].child] + epsilon)
            .fold(f64::NEG_INFINITY, f64::max);
        if times[node] < floor {
            times[node] = floor;
        }
    }
}
