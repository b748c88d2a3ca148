use std::ffi::OsString;
use std::io::Write;

use tracing::{Level, debug};

use crate::api::date_file_to_path;

use super::args::{BIN_NAME, build_parser, parse};
use super::errors::AppError;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => return,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // A subscriber may already be installed when running embedded
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn try_run<I, T>(tokens: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let parser = build_parser();
    let args = parse(&parser, tokens)?;
    init_logging(args.verbosity);
    debug!("Arguments: {:?}", args);

    date_file_to_path(&args.ts, &args.output, &args.params())?;
    Ok(())
}

/// Write the single diagnostic for `error` and return the exit status
fn report(error: &AppError, out: &mut dyn Write, err: &mut dyn Write) -> u8 {
    match error {
        AppError::Usage(e) => {
            let sink: &mut dyn Write = if e.use_stderr() { &mut *err } else { &mut *out };
            let _ = write!(sink, "{}", e.render());
            let _ = sink.flush();
        }
        AppError::Run(e) => {
            let _ = writeln!(err, "{BIN_NAME}: error: {e}");
            let _ = err.flush();
        }
    }
    error.exit_code()
}

/// Run one invocation end to end and return its exit status.
///
/// `tokens` excludes the program name. On success nothing is written to
/// either sink and the status is 0. Usage errors print clap's diagnostic and
/// return its status (2); load, dating and write errors print one line to
/// `err` and return 1. The output path is not touched unless loading and
/// dating succeed.
pub fn run<I, T>(tokens: I, out: &mut dyn Write, err: &mut dyn Write) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match try_run(tokens) {
        Ok(()) => 0,
        Err(e) => report(&e, out, err),
    }
}
