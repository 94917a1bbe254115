//! Repository configuration.
//!
//! # Responsibility
//! - Carry the per-repository switches hosts can tune: diagnostic logging and
//!   the advisory operation timeout.
//! - Provide environment presets used by host wiring.
//!
//! # Invariants
//! - `operation_timeout` is advisory only. It is reported in logs and never
//!   aborts a storage call.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);
const DEBUG_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Host environment the repository runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppEnvironment {
    Debug,
    Testing,
    Production,
}

impl AppEnvironment {
    /// Whether repository diagnostics are emitted in this environment.
    pub fn enable_logging(self) -> bool {
        match self {
            Self::Debug | Self::Testing => true,
            Self::Production => false,
        }
    }

    /// Advisory repository timeout for this environment.
    pub fn repository_timeout(self) -> Duration {
        match self {
            Self::Debug | Self::Testing => DEBUG_OPERATION_TIMEOUT,
            Self::Production => DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// Options recognized by every `NotesRepository` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Emit one diagnostic event per repository operation.
    pub enable_logging: bool,
    /// Operations slower than this are logged with `status=slow`.
    pub operation_timeout: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl RepositoryConfig {
    /// Verbose preset with a relaxed timeout.
    pub fn debug() -> Self {
        Self::for_environment(AppEnvironment::Debug)
    }

    /// Quiet preset.
    pub fn production() -> Self {
        Self::for_environment(AppEnvironment::Production)
    }

    pub fn for_environment(environment: AppEnvironment) -> Self {
        Self {
            enable_logging: environment.enable_logging(),
            operation_timeout: environment.repository_timeout(),
        }
    }

    /// Returns whether an operation that took `elapsed` overran the timeout.
    pub fn is_slow(&self, elapsed: Duration) -> bool {
        elapsed > self.operation_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::{AppEnvironment, RepositoryConfig};
    use std::time::Duration;

    #[test]
    fn default_enables_logging_with_ten_second_timeout() {
        let config = RepositoryConfig::default();
        assert!(config.enable_logging);
        assert_eq!(config.operation_timeout, Duration::from_secs(10));
    }

    #[test]
    fn presets_follow_environment() {
        assert_eq!(
            RepositoryConfig::debug(),
            RepositoryConfig {
                enable_logging: true,
                operation_timeout: Duration::from_secs(30),
            }
        );
        assert_eq!(
            RepositoryConfig::production(),
            RepositoryConfig {
                enable_logging: false,
                operation_timeout: Duration::from_secs(10),
            }
        );
        assert!(RepositoryConfig::for_environment(AppEnvironment::Testing).enable_logging);
    }

    #[test]
    fn is_slow_only_past_the_timeout() {
        let config = RepositoryConfig::production();
        assert!(!config.is_slow(Duration::from_secs(10)));
        assert!(config.is_slow(Duration::from_millis(10_001)));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = RepositoryConfig::debug();
        let json = serde_json::to_string(&config).expect("serializable");
        let parsed: RepositoryConfig = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(parsed, config);
    }
}
