//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Wraps tree sequence I/O failures with the path involved, and passes dating
//! errors through unchanged.
use std::path::PathBuf;

use thiserror::Error;

use crate::core::dating::DatingError;
use crate::io::TreesError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot load tree sequence from {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: TreesError,
    },

    #[error("cannot write tree sequence to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: TreesError,
    },

    #[error(transparent)]
    Dating(#[from] DatingError),
}

impl Error {
    pub fn load<P: Into<PathBuf>>(path: P, source: TreesError) -> Self {
        Error::Load {
            path: path.into(),
            source,
        }
    }

    pub fn save<P: Into<PathBuf>>(path: P, source: TreesError) -> Self {
        Error::Save {
            path: path.into(),
            source,
        }
    }
}
