//! High-level, ergonomic library API: date an in-memory tree sequence, or
//! load, date and save in one call. Prefer these entrypoints over the
//! low-level `core::dating` modules when embedding tsdate.
use std::path::Path;

use tracing::info;

use crate::core::dating;
use crate::core::params::DatingParams;
use crate::error::{Error, Result};
use crate::io::trees::{TreeSequence, load_tree_sequence, save_tree_sequence};

/// Estimate node and mutation ages of an in-memory tree sequence
pub fn date(ts: &TreeSequence, params: &DatingParams) -> Result<TreeSequence> {
    Ok(dating::date(ts, params)?)
}

/// Load `input`, date it and write the result to `output`.
/// Nothing is written to `output` unless loading and dating both succeed.
pub fn date_file_to_path(input: &Path, output: &Path, params: &DatingParams) -> Result<()> {
    let ts = load_tree_sequence(input).map_err(|e| Error::load(input, e))?;
    info!("Loaded {:?}: {} nodes, {} edges", input, ts.nodes.len(), ts.edges.len());

    let dated = date(&ts, params)?;

    save_tree_sequence(&dated, output).map_err(|e| Error::save(output, e))?;
    info!("Dated tree sequence written: {:?} -> {:?}", input, output);
    Ok(())
}
