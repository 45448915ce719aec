//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so that `--json` output on stdout stays machine
//! readable.
//!
//! # Log Levels
//!
//! - `warn`: default; nothing is printed for a normal run
//! - `info`: unit system conversions, file loads
//! - `debug`: one line per pipeline stage and per fired advisory
//! - `trace`: every applied factor and resolved extent

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence unless a verbosity flag was given.
pub fn init_logging(level: LevelFilter, explicit: bool) {
    let filter = if explicit {
        EnvFilter::default().add_directive(level.into())
    } else {
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    };

    let layer = fmt::layer().with_writer(io::stderr).with_target(false).without_time();

    tracing_subscriber::registry().with(filter).with(layer).init();
}
