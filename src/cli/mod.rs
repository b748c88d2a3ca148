//! Command Line Interface (CLI) layer for tsdate.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for a single dating run. The
//! runner writes through caller-supplied output/error sinks, which is how
//! the binary and the tests share it.
//!
//! If you are embedding tsdate into another application, prefer the
//! high-level `tsdate::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::{CliArgs, build_parser, parse};
pub use runner::run;
