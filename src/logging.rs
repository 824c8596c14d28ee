//! Tracing subscriber setup for the binary.

use std::sync::Once;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "client_book=info";

static INIT_ONCE: Once = Once::new();

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Install the global subscriber. Later calls are ignored.
///
/// The filter comes from `RUST_LOG` when set, otherwise `client_book=info`.
pub fn init(format: LogFormat) {
    INIT_ONCE.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        match format {
            LogFormat::Pretty => builder.init(),
            LogFormat::Json => builder.json().init(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(LogFormat::Pretty);
        init(LogFormat::Json);
    }
}
