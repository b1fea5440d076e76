//! Tracing subscriber setup for the command line tool.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` with `verbose`
/// and `warn` without, so command output on stdout stays clean.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "ftsmind=debug" } else { "ftsmind=warn" };
        EnvFilter::new(level)
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact();

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
