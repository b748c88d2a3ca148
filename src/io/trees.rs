use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::Builder;
use thiserror::Error;
use tracing::debug;

/// Bit in `Node::flags` marking a sampled genome
pub const NODE_IS_SAMPLE: u32 = 1;

/// Newest tree sequence document version this crate reads and writes
pub const FORMAT_VERSION: u32 = 1;

/// Errors encountered when reading, validating or writing tree sequence files
#[derive(Debug, Error)]
pub enum TreesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tree sequence: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not replace output file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("unsupported tree sequence version {found} (newest supported: {})", FORMAT_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("sequence length must be positive and finite, got {0}")]
    SequenceLength(f64),
    #[error("edge {edge} references node {node}, but there are only {num_nodes} nodes")]
    EdgeNodeOutOfRange {
        edge: usize,
        node: usize,
        num_nodes: usize,
    },
    #[error("edge {edge} has invalid interval [{left}, {right})")]
    EdgeInterval { edge: usize, left: f64, right: f64 },
    #[error("edge {edge}: parent time {parent_time} must be greater than child time {child_time}")]
    TimeOrder {
        edge: usize,
        parent_time: f64,
        child_time: f64,
    },
    #[error("node {node} has non-finite time {time}")]
    NodeTime { node: usize, time: f64 },
    #[error("site {site} position {position} is outside [0, {sequence_length})")]
    SitePosition {
        site: usize,
        position: f64,
        sequence_length: f64,
    },
    #[error("sites must be sorted by position (site {0} is out of order)")]
    UnsortedSites(usize),
    #[error("mutation {mutation} references site {site}, but there are only {num_sites} sites")]
    MutationSiteOutOfRange {
        mutation: usize,
        site: usize,
        num_sites: usize,
    },
    #[error("mutation {mutation} references node {node}, but there are only {num_nodes} nodes")]
    MutationNodeOutOfRange {
        mutation: usize,
        node: usize,
        num_nodes: usize,
    },
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

fn default_population() -> i32 {
    -1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Age in generations before the present
    pub time: f64,
    #[serde(default)]
    pub flags: u32,
    #[serde(default = "default_population")]
    pub population: i32,
}

impl Node {
    pub fn sample(time: f64) -> Self {
        Self {
            time,
            flags: NODE_IS_SAMPLE,
            population: -1,
        }
    }

    pub fn ancestor(time: f64) -> Self {
        Self {
            time,
            flags: 0,
            population: -1,
        }
    }

    pub fn is_sample(&self) -> bool {
        self.flags & NODE_IS_SAMPLE != 0
    }
}

/// Inheritance of the half-open genome interval `[left, right)` by `child` from `parent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub left: f64,
    pub right: f64,
    pub parent: usize,
    pub child: usize,
}

impl Edge {
    pub fn span(&self) -> f64 {
        self.right - self.left
    }

    pub fn covers(&self, position: f64) -> bool {
        self.left <= position && position < self.right
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub position: f64,
    #[serde(default)]
    pub ancestral_state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub site: usize,
    pub node: usize,
    #[serde(default)]
    pub derived_state: String,
    /// Estimated age; unknown until the tree sequence has been dated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

/// Timestamped record of the software and parameters that produced a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub timestamp: String,
    pub record: serde_json::Value,
}

/// In-memory tree sequence: node, edge, site, mutation and provenance tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSequence {
    #[serde(default = "default_version")]
    pub version: u32,
    pub sequence_length: f64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub mutations: Vec<Mutation>,
    #[serde(default)]
    pub provenances: Vec<Provenance>,
}

impl TreeSequence {
    pub fn new(sequence_length: f64) -> Self {
        Self {
            version: FORMAT_VERSION,
            sequence_length,
            nodes: Vec::new(),
            edges: Vec::new(),
            sites: Vec::new(),
            mutations: Vec::new(),
            provenances: Vec::new(),
        }
    }

    pub fn is_sample(&self, node: usize) -> bool {
        self.nodes.get(node).is_some_and(Node::is_sample)
    }

    /// Indexes of all sample nodes, in node order
    pub fn samples(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, node)| node.is_sample().then_some(id))
            .collect()
    }

    pub fn num_samples(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_sample()).count()
    }

    /// Check the structural invariants every loaded or dated tree sequence must hold
    pub fn validate(&self) -> Result<(), TreesError> {
        if self.version == 0 || self.version > FORMAT_VERSION {
            return Err(TreesError::UnsupportedVersion {
                found: self.version,
            });
        }
        if !(self.sequence_length > 0.0 && self.sequence_length.is_finite()) {
            return Err(TreesError::SequenceLength(self.sequence_length));
        }

        let num_nodes = self.nodes.len();
        for (id, node) in self.nodes.iter().enumerate() {
            if !node.time.is_finite() {
                return Err(TreesError::NodeTime {
                    node: id,
                    time: node.time,
                });
            }
        }

        for (id, edge) in self.edges.iter().enumerate() {
            for node in [edge.parent, edge.child] {
                if node >= num_nodes {
                    return Err(TreesError::EdgeNodeOutOfRange {
                        edge: id,
                        node,
                        num_nodes,
                    });
                }
            }
            if !(edge.left >= 0.0 && edge.left < edge.right && edge.right <= self.sequence_length)
            {
                return Err(TreesError::EdgeInterval {
                    edge: id,
                    left: edge.left,
                    right: edge.right,
                });
            }
            let parent_time = self.nodes[edge.parent].time;
            let child_time = self.nodes[edge.child].time;
            if parent_time <= child_time {
                return Err(TreesError::TimeOrder {
                    edge: id,
                    parent_time,
                    child_time,
                });
            }
        }

        let mut last_position = f64::NEG_INFINITY;
        for (id, site) in self.sites.iter().enumerate() {
            if !(site.position >= 0.0 && site.position < self.sequence_length) {
                return Err(TreesError::SitePosition {
                    site: id,
                    position: site.position,
                    sequence_length: self.sequence_length,
                });
            }
            if site.position < last_position {
                return Err(TreesError::UnsortedSites(id));
            }
            last_position = site.position;
        }

        let num_sites = self.sites.len();
        for (id, mutation) in self.mutations.iter().enumerate() {
            if mutation.site >= num_sites {
                return Err(TreesError::MutationSiteOutOfRange {
                    mutation: id,
                    site: mutation.site,
                    num_sites,
                });
            }
            if mutation.node >= num_nodes {
                return Err(TreesError::MutationNodeOutOfRange {
                    mutation: id,
                    node: mutation.node,
                    num_nodes,
                });
            }
        }

        Ok(())
    }
}

/// Read and validate a tree sequence document
pub fn load_tree_sequence<P: AsRef<Path>>(path: P) -> Result<TreeSequence, TreesError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let ts: TreeSequence = serde_json::from_reader(reader)?;
    ts.validate()?;
    debug!(
        "Loaded {:?}: {} nodes, {} edges, {} sites, {} mutations",
        path,
        ts.nodes.len(),
        ts.edges.len(),
        ts.sites.len(),
        ts.mutations.len()
    );
    Ok(ts)
}

/// Write a tree sequence document.
/// The document is written to a temporary file next to `path` and renamed over it,
/// so an existing file at `path` is only replaced by a complete document.
pub fn save_tree_sequence<P: AsRef<Path>>(ts: &TreeSequence, path: P) -> Result<(), TreesError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Create the temp file the way `File::create` would (0666 minus umask),
    // then take over the mode of any file being replaced.
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, ts)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    debug!("Wrote {:?}", path);
    Ok(())
}
