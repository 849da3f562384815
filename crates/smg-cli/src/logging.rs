use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter,
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
};

/// Environment variable that, when set, replaces the `-v`/`-q` level with a
/// full filter directive such as `statmech_glass::engine=trace`.
pub const LOG_ENV_VAR: &str = "SMG_LOG";

/// Level implied by the `-v` count. `-q` keeps errors visible since a failed
/// fit or a missing parameter file is reported through them.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Filter for the whole subscriber. `directives` (normally the value of
/// [`LOG_ENV_VAR`]) win over the level from the flags; unparsable parts are
/// dropped.
fn build_filter(verbosity: u8, quiet: bool, directives: Option<&str>) -> EnvFilter {
    let builder =
        EnvFilter::builder().with_default_directive(level_filter(verbosity, quiet).into());
    match directives {
        Some(directives) if !directives.trim().is_empty() => builder.parse_lossy(directives),
        _ => builder.parse_lossy(""),
    }
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let directives = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(verbosity, quiet, directives.as_deref());

    // Fit progress owns stderr while hopping; keep console records short.
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry().with(filter).with(console);

    match log_file {
        Some(path) => {
            let file = File::create(&path).map_err(CliError::Io)?;
            let record = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_target(true);
            subscriber.with(record).init();
        }
        None => subscriber.init(),
    }

    Ok(())
}
