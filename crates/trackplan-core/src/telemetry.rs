//! Tracing initialisation for trackplan binaries.
//!
//! Without `RUST_LOG`, only trackplan's own crates log at the requested
//! level; everything else is held at `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const TRACKPLAN_TARGETS: [&str; 3] = ["trackplan", "trackplan_core", "trackplan_ports"];

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(level: Level) -> String {
    let mut directives = String::from("warn");
    for target in TRACKPLAN_TARGETS {
        directives.push_str(&format!(",{target}={}", level.as_str().to_lowercase()));
    }
    directives
}

/// Initialise the global tracing subscriber.
///
/// Returns `false` if a subscriber was already installed; the first one wins.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let layer = fmt::layer().with_target(json);
    let installed = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
    };
    installed.is_ok()
}
