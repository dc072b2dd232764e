//! Tracing initialisation for issueflow binaries.
//!
//! Logs go to stderr; stdout is reserved for command output (the pull
//! request URL or a JSON run report).

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const CRATES: [&str; 4] = [
    "issueflow",
    "issueflow_core",
    "issueflow_github",
    "issueflow_anthropic",
];

/// Filter used when `RUST_LOG` is unset: issueflow crates at `level`,
/// everything else (hyper, reqwest, rustls) at `warn` or quieter.
pub fn default_directives(level: Level) -> String {
    let floor = if level <= Level::WARN { level } else { Level::WARN };
    let mut directives = floor.as_str().to_lowercase();
    for krate in CRATES {
        directives.push_str(&format!(",{krate}={}", level.as_str().to_lowercase()));
    }
    directives
}

/// Initialise the global subscriber. Only the first call takes effect.
///
/// * `json`: newline-delimited JSON instead of human-readable lines.
/// * `level`: verbosity for issueflow crates when `RUST_LOG` is unset.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let _ = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
}
