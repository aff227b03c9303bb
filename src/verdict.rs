//! Verdict record returned for every analysis
//!
//! The serialized field names are the wire contract of the inbound boundary:
//! `policy_id`, `type`, `risk_level`, `risk_score`, `details`, `explanation`,
//! `timestamp`, `cached`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::XrayError;

/// Length of a policy id in hex characters (28-byte script hash)
pub const POLICY_ID_HEX_LEN: usize = 56;

/// Risk level, ordered LOW < MEDIUM < HIGH < UNKNOWN
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classification and risk output for a policy at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub policy_id: String,
    /// Human-readable asset category
    #[serde(rename = "type")]
    pub asset_type: String,
    pub risk_level: RiskLevel,
    /// 0-100
    pub risk_score: u8,
    /// Echoed script descriptor or diagnostic notes
    #[serde(default)]
    pub details: serde_json::Value,
    pub explanation: String,
    pub timestamp: DateTime<Utc>,
    /// True only when served from the verdict cache on this call
    #[serde(default)]
    pub cached: bool,
}

impl Verdict {
    pub fn new(
        policy_id: impl Into<String>,
        asset_type: impl Into<String>,
        risk_level: RiskLevel,
        risk_score: u8,
        details: serde_json::Value,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            policy_id: policy_id.into(),
            asset_type: asset_type.into(),
            risk_level,
            risk_score: risk_score.min(100),
            details,
            explanation: explanation.into(),
            timestamp: Utc::now(),
            cached: false,
        }
    }

    /// Verdict served when no provider credential is configured
    pub fn fallback(policy_id: &str) -> Self {
        Self::new(
            policy_id,
            "Unknown",
            RiskLevel::Low,
            10,
            empty_details(),
            "Provider API key not set, running in fallback mode.",
        )
    }

    /// Verdict served when the provider exceeded the fetch budget
    pub fn timed_out(policy_id: &str) -> Self {
        Self::new(
            policy_id,
            "Error",
            RiskLevel::Unknown,
            0,
            empty_details(),
            "Analysis timed out. External API slow.",
        )
    }

    /// Verdict served for any other failure, carrying its message
    pub fn failed(policy_id: &str, message: impl std::fmt::Display) -> Self {
        Self::new(
            policy_id,
            "Error",
            RiskLevel::Unknown,
            0,
            empty_details(),
            format!("Analysis failed: {}", message),
        )
    }

    pub fn is_error(&self) -> bool {
        self.risk_level == RiskLevel::Unknown
    }
}

fn empty_details() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Validate an inbound policy id (56 hex characters)
///
/// The analyzer itself treats ids as opaque; this check belongs to the
/// request boundary.
pub fn validate_policy_id(policy_id: &str) -> Result<(), XrayError> {
    if policy_id.len() != POLICY_ID_HEX_LEN {
        return Err(XrayError::InvalidPolicyId(format!(
            "expected {} hex characters, got {}",
            POLICY_ID_HEX_LEN,
            policy_id.len()
        )));
    }
    if !policy_id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(XrayError::InvalidPolicyId(
            "policy id must be hexadecimal".to_string(),
        ));
    }
    Ok(())
}
