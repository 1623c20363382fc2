//! Client configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::camera::CaptureConstraints;
use crate::error::RescueResult;
use crate::geolocation::PositionOptions;

/// Simulated collaborator behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    /// Delay before a report submission resolves, in milliseconds.
    pub report_latency_ms: u64,
    /// Delay before a listing resolves, in milliseconds.
    pub listing_latency_ms: u64,
    /// Reject every report (exercises the error path).
    pub fail_reports: bool,
}

impl ApiConfig {
    /// Report latency as a [`Duration`].
    #[must_use]
    pub fn report_latency(&self) -> Duration {
        Duration::from_millis(self.report_latency_ms)
    }

    /// Listing latency as a [`Duration`].
    #[must_use]
    pub fn listing_latency(&self) -> Duration {
        Duration::from_millis(self.listing_latency_ms)
    }

    /// Config with no artificial delay.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            report_latency_ms: 0,
            listing_latency_ms: 0,
            fail_reports: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            report_latency_ms: 2000,
            listing_latency_ms: 1000,
            fail_reports: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RescueConfig {
    /// Camera stream constraints.
    pub camera: CaptureConstraints,
    /// Position request options.
    pub geolocation: PositionOptions,
    /// Simulated collaborator.
    pub api: ApiConfig,
}

impl RescueConfig {
    /// Parse a JSON config, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RescueError::Serialization`] on malformed JSON.
    pub fn from_json(json: &str) -> RescueResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FacingMode;

    #[test]
    fn empty_object_yields_defaults() {
        let config = RescueConfig::from_json("{}").unwrap();
        assert_eq!(config, RescueConfig::default());
        assert_eq!(config.api.report_latency(), Duration::from_secs(2));
        assert_eq!(config.api.listing_latency(), Duration::from_secs(1));
        assert_eq!(config.geolocation.timeout_ms, 10_000);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = RescueConfig::from_json(
            r#"{"camera":{"facingMode":"user"},"api":{"failReports":true}}"#,
        )
        .unwrap();
        assert_eq!(config.camera.facing_mode, FacingMode::User);
        assert_eq!(config.camera.ideal_width, 1920);
        assert!(config.api.fail_reports);
        assert_eq!(config.api.report_latency_ms, 2000);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(RescueConfig::from_json("{ not json").is_err());
    }
}
