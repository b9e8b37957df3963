//! Store configuration.
//!
//! Loaded from a JSON file; every key is optional and falls back to the
//! defaults below.
//!
//! ```json
//! {
//!   "undo_window_ms": 30000,
//!   "hold_mode": "toast",
//!   "transition_policy": "unchecked",
//!   "expected_evidence": { "LOST": ["SHIPSTATION_SHIPMENT", "TRACKING_EVENTS"] }
//! }
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use recoverly_core::{ExpectedEvidence, ParseTokenError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::StoreError;
use crate::undo::DEFAULT_UNDO_WINDOW;

/// What "hold" does to a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldMode {
    /// Announce the hold and arm the undo window; the case is not touched.
    #[default]
    Toast,
    /// Mark the case held and log it on the timeline. Status is unchanged.
    Persist,
}

/// Whether `approve` respects the lifecycle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Apply every transition; illegal ones are only logged.
    #[default]
    Unchecked,
    /// Reject illegal transitions and approvals with incomplete evidence.
    Enforced,
}

impl FromStr for HoldMode {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toast" => Ok(HoldMode::Toast),
            "persist" => Ok(HoldMode::Persist),
            _ => Err(ParseTokenError {
                kind: "hold mode",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unchecked" => Ok(TransitionPolicy::Unchecked),
            "enforced" => Ok(TransitionPolicy::Enforced),
            _ => Err(ParseTokenError {
                kind: "transition policy",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub undo_window_ms: u64,
    pub hold_mode: HoldMode,
    pub transition_policy: TransitionPolicy,
    pub expected_evidence: ExpectedEvidence,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            undo_window_ms: DEFAULT_UNDO_WINDOW.as_millis() as u64,
            hold_mode: HoldMode::default(),
            transition_policy: TransitionPolicy::default(),
            expected_evidence: ExpectedEvidence::default(),
        }
    }
}

impl StoreConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::ConfigNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let config: StoreConfig = serde_json::from_str(&json)?;
        info!(
            path = %path.display(),
            hold_mode = ?config.hold_mode,
            policy = ?config.transition_policy,
            "loaded store config"
        );
        Ok(config)
    }

    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recoverly_core::{CaseLane, EvidenceType};

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.undo_window(), Duration::from_secs(30));
        assert_eq!(config.hold_mode, HoldMode::Toast);
        assert_eq!(config.transition_policy, TransitionPolicy::Unchecked);
        assert_eq!(config.expected_evidence, ExpectedEvidence::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"hold_mode": "persist", "undo_window_ms": 5000}"#).unwrap();
        assert_eq!(config.hold_mode, HoldMode::Persist);
        assert_eq!(config.undo_window(), Duration::from_secs(5));
        assert_eq!(config.transition_policy, TransitionPolicy::Unchecked);
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("recoverly.json");
        std::fs::write(
            &path,
            r#"{"transition_policy": "enforced", "expected_evidence": {"LOST": ["TRACKING_EVENTS"]}}"#,
        )
        .unwrap();
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.transition_policy, TransitionPolicy::Enforced);
        assert_eq!(
            config.expected_evidence.for_lane(CaseLane::Lost),
            &[EvidenceType::TrackingEvents]
        );
        // A table given in the file replaces the default wholesale.
        assert!(config.expected_evidence.for_lane(CaseLane::Damage).is_empty());
    }

    #[test]
    fn load_missing_file_errors() {
        let result = StoreConfig::load(Path::new("/nonexistent/recoverly.json"));
        assert!(matches!(result, Err(StoreError::ConfigNotFound(_))));
    }

    #[test]
    fn unknown_hold_mode_is_rejected() {
        let result = serde_json::from_str::<StoreConfig>(r#"{"hold_mode": "freeze"}"#);
        assert!(result.is_err());
        assert!("freeze".parse::<HoldMode>().is_err());
        assert_eq!("Persist".parse::<HoldMode>().unwrap(), HoldMode::Persist);
    }
}
