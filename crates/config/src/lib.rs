//! # Config - environment-driven settings
//!
//! Resolves the process-wide settings that govern item delivery:
//!
//! ```text
//! MEDIAMETRICS_ENABLED          >0 enables, 0 or less disables, -1/unset defers (default: -1)
//! MEDIAMETRICS_ENABLED_PERSIST  consulted when the above defers, same rules (default: -1)
//! (both deferring)              delivery enabled
//! MEDIAMETRICS_BIND_ATTEMPTS    service lookups before giving up           (default: 2)
//! MEDIAMETRICS_SERVICE_NAME     name handed to the service locator         (default: "media.metrics")
//! ```
//!
//! An empty variable is treated as unset. A value that does not parse is an
//! error rather than a silent fallback, so a typo cannot quietly switch
//! delivery on or off.

use thiserror::Error;
use tracing::debug;

pub const ENV_ENABLED: &str = "MEDIAMETRICS_ENABLED";
pub const ENV_ENABLED_PERSIST: &str = "MEDIAMETRICS_ENABLED_PERSIST";
pub const ENV_BIND_ATTEMPTS: &str = "MEDIAMETRICS_BIND_ATTEMPTS";
pub const ENV_SERVICE_NAME: &str = "MEDIAMETRICS_SERVICE_NAME";

/// Value of the enablement switches meaning "not decided here".
pub const ENABLED_UNSET: i32 = -1;
pub const DEFAULT_ENABLED: i32 = 1;
pub const DEFAULT_BIND_ATTEMPTS: u32 = 2;
pub const DEFAULT_SERVICE_NAME: &str = "media.metrics";

/// Errors that can occur while resolving configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something that is not a valid `expected`.
    #[error("{var}={value:?} is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Resolved delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether items may be handed to the recording service at all.
    pub enabled: bool,
    /// How many failed lookups a connection tolerates before it stops trying.
    pub bind_attempts: u32,
    /// Name passed to the service locator.
    pub service_name: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_ENABLED > 0,
            bind_attempts: DEFAULT_BIND_ATTEMPTS,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl MetricsConfig {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolves the settings through `lookup`, which maps a variable name to
    /// its value (or `None` when unset).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut enabled = parse_or(ENV_ENABLED, get(ENV_ENABLED), ENABLED_UNSET, "integer")?;
        if enabled == ENABLED_UNSET {
            enabled = parse_or(
                ENV_ENABLED_PERSIST,
                get(ENV_ENABLED_PERSIST),
                ENABLED_UNSET,
                "integer",
            )?;
        }
        if enabled == ENABLED_UNSET {
            enabled = DEFAULT_ENABLED;
        }

        let bind_attempts = parse_or(
            ENV_BIND_ATTEMPTS,
            get(ENV_BIND_ATTEMPTS),
            DEFAULT_BIND_ATTEMPTS,
            "attempt count",
        )?;
        let service_name =
            get(ENV_SERVICE_NAME).unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        let cfg = Self {
            enabled: enabled > 0,
            bind_attempts,
            service_name,
        };
        debug!(?cfg, "resolved metrics configuration");
        Ok(cfg)
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            var,
            value,
            expected,
        }),
    }
}

#[cfg(test)]
mod tests;
