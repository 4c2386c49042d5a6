//! File logging for the terminal host
//!
//! The screen belongs to the editor while it runs, so log output goes to
//! `praecordi.log` in the temp directory. `PRAECORDI_LOG` takes an
//! `EnvFilter` directive such as `debug` or `praecordi=trace`.

use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use praecordi::{PraecordiError, Result};

/// Environment variable holding the filter directive
pub const LOG_ENV: &str = "PRAECORDI_LOG";
/// Log file name inside the log directory
pub const LOG_FILE: &str = "praecordi.log";

const DEFAULT_DIRECTIVE: &str = "info";

/// Default log file location
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE)
}

/// Build the filter from a directive, falling back to `info`
fn filter_from(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber, writing to `dir/praecordi.log`
pub fn init(dir: &Path) -> Result<()> {
    let directive = std::env::var(LOG_ENV).ok();
    let file = tracing_appender::rolling::never(dir, LOG_FILE);

    tracing_subscriber::fmt()
        .with_env_filter(filter_from(directive.as_deref()))
        .with_writer(file)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| PraecordiError::Message(format!("cannot start logging: {}", e)))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "praecordi starting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_default() {
        assert_eq!(filter_from(None).to_string(), "info");
    }

    #[test]
    fn test_filter_from_directive() {
        assert_eq!(filter_from(Some("debug")).to_string(), "debug");
    }

    #[test]
    fn test_log_path_in_temp_dir() {
        let path = log_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with(LOG_FILE));
    }
}
