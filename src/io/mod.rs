//! I/O layer for tree sequence documents.
//! Provides the `trees` data model with load/validate/save, and
//! `provenance` records describing how a file was produced.
pub mod trees;
pub use trees::{
    Edge, Mutation, Node, Provenance, TreeSequence, TreesError, load_tree_sequence,
    save_tree_sequence,
};

pub mod provenance;
