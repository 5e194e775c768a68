//! Verifier configuration.

use crate::chain::DEFAULT_MAX_CHAIN_DEPTH;
use crate::error::{LicenseError, LicenseResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Tunables for [`crate::Verifier`].
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
    /// Maximum number of licenses in a chain, leaf and root included.
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,
    /// Leeway applied to both ends of every validity window.
    #[serde(default)]
    pub clock_skew_secs: i64,
}

fn default_max_chain_depth() -> usize {
    DEFAULT_MAX_CHAIN_DEPTH
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: default_max_chain_depth(),
            clock_skew_secs: 0,
        }
    }
}

impl VerifierConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(text: &str) -> LicenseResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| LicenseError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the depth limit is at least one and the skew is a
    /// non-negative, representable number of seconds.
    pub fn validate(&self) -> LicenseResult<()> {
        if self.max_chain_depth == 0 {
            return Err(LicenseError::Config(
                "max_chain_depth must be at least 1".to_string(),
            ));
        }
        self.clock_skew().map(|_| ())
    }

    /// The clock skew as a duration.
    pub fn clock_skew(&self) -> LicenseResult<Duration> {
        if self.clock_skew_secs < 0 {
            return Err(LicenseError::Config(format!(
                "clock_skew_secs must not be negative, got {}",
                self.clock_skew_secs
            )));
        }
        Duration::try_seconds(self.clock_skew_secs).ok_or_else(|| {
            LicenseError::Config(format!(
                "clock_skew_secs {} is out of range",
                self.clock_skew_secs
            ))
        })
    }
}
