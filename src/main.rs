//! tsdate CLI entrypoint.
//!
//! Thin wrapper over the `cli` module: hand the arguments and the real
//! stdout/stderr to the runner and exit with its status.
//! For programmatic use, prefer the library API (`tsdate::api`).

use std::process::ExitCode;

fn main() -> ExitCode {
    let status = tsdate::cli::run(
        std::env::args_os().skip(1),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    );
    ExitCode::from(status)
}
