//! Process-wide configuration.
//!
//! # Responsibility
//! - Carry the API base URL, network timeout and cache location as one
//!   explicit value handed to constructors.
//!
//! # Invariants
//! - Configuration is read-only after startup; no ambient globals.

use std::path::PathBuf;
use std::time::Duration;

/// Default public catalog API base.
pub const DEFAULT_API_BASE: &str = "https://api.iconify.design";

/// Default per-request network timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Immutable runtime configuration for store and client construction.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub api_base: String,
    pub timeout: Duration,
    pub cache_dir: PathBuf,
}

impl CoreConfig {
    /// Creates a configuration with defaults and the given cache directory.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DEFAULT_API_BASE};
    use std::time::Duration;

    #[test]
    fn builder_overrides_defaults() {
        let config = CoreConfig::new("/tmp/cache")
            .with_api_base("http://localhost:9000")
            .with_timeout(Duration::from_secs(2));
        assert_eq!(config.api_base, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(2));

        let defaults = CoreConfig::new("/tmp/cache");
        assert_eq!(defaults.api_base, DEFAULT_API_BASE);
    }
}
