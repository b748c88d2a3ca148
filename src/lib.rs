#![doc = r#"
tsdate — estimate the ages of nodes in a genealogical tree sequence.

This crate turns a tree sequence (nodes, edges, sites and mutations describing
the genealogy of a set of sampled genomes) into a dated tree sequence: every
non-sample node and every mutation receives an age in generations. It powers
the `tsdate` CLI and can be embedded in your own Rust applications.

Method
------
Candidate ages are discretised on a time grid (`adaptive` or `uniform`). Each
non-sample node gets a coalescent-style prior based on how many samples sit
below it; each edge contributes a Poisson likelihood from the mutations it
carries (and, optionally, the absence of recombination along it). An
inside/outside pass over the genealogy yields a posterior for every node, whose
mean becomes the node's age. Ages are finally nudged so that every parent is
older than its children.

Add dependency
--------------
```toml
[dependencies]
tsdate = "0.1"
```

Quick start: date a file
------------------------
```rust,no_run
use std::path::Path;
use tsdate::{date_file_to_path, DatingParams, TimeGrid};

fn main() -> tsdate::Result<()> {
    let params = DatingParams {
        population_size: 10_000.0,
        time_grid: TimeGrid::Adaptive,
        mutation_rate: Some(1e-8),
        recombination_rate: None,
        slices: 50,
        epsilon: 1e-6,
    };

    date_file_to_path(Path::new("in.trees"), Path::new("out.trees"), &params)
}
```

Date an in-memory tree sequence
-------------------------------
```rust
use tsdate::{date, DatingParams, Edge, Node, TreeSequence};

fn main() -> tsdate::Result<()> {
    let mut ts = TreeSequence::new(1000.0);
    ts.nodes = vec![Node::sample(0.0), Node::sample(0.0), Node::ancestor(1.0)];
    ts.edges = (0..2)
        .map(|child| Edge { left: 0.0, right: 1000.0, parent: 2, child })
        .collect();

    let dated = date(&ts, &DatingParams::default())?;
    assert!(dated.nodes[2].time > 0.0);
    Ok(())
}
```

Error handling
--------------
All public functions return `tsdate::Result<T>`; match on `tsdate::Error` to
tell load, dating and write failures apart.

```rust,no_run
use std::path::Path;
use tsdate::{date_file_to_path, DatingParams, Error};

fn main() {
    match date_file_to_path(Path::new("in.trees"), Path::new("out.trees"), &DatingParams::default()) {
        Ok(()) => {}
        Err(Error::Load { path, source }) => eprintln!("cannot read {}: {source}", path.display()),
        Err(Error::Dating(e)) => eprintln!("cannot date: {e}"),
        Err(other) => eprintln!("{other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level entry points.
- [`cli`] — the argument parser and the dispatcher behind the binary.
- [`core`] — parameters and the dating engine.
- [`io`] — tree sequence documents and provenance.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use crate::core::dating::DatingError;
pub use crate::core::params::DatingParams;
pub use crate::error::{Error, Result};
pub use crate::types::TimeGrid;

pub use crate::io::trees::{
    Edge, Mutation, Node, Provenance, Site, TreeSequence, TreesError, load_tree_sequence,
    save_tree_sequence,
};

pub use crate::api::{date, date_file_to_path};
