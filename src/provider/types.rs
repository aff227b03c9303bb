//! Normalized script metadata
//!
//! Provider JSON is reduced to a closed set of script kinds so the
//! classification engine can match on variants instead of strings. The raw
//! JSON is retained and echoed in verdict details.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;

/// Plutus language version carried in the provider's type string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlutusVersion {
    V1,
    V2,
    V3,
    /// A plutus type string with an unrecognized version suffix
    Other(String),
}

/// Kind of script governing a policy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptKind {
    Plutus(PlutusVersion),
    Timelock,
    /// Any other non-empty provider type string
    Other(String),
}

impl ScriptKind {
    /// Normalize a provider type string
    ///
    /// Any type containing "plutus" (case-insensitive) is a Plutus script so
    /// that versioned strings like "plutusV1"/"plutusV2" are covered. Only
    /// the exact string "timelock" is a timelock script.
    pub fn from_type_str(raw: &str) -> Self {
        let lowered = raw.to_ascii_lowercase();
        if lowered.contains("plutus") {
            let version = if lowered.ends_with("v1") {
                PlutusVersion::V1
            } else if lowered.ends_with("v2") {
                PlutusVersion::V2
            } else if lowered.ends_with("v3") {
                PlutusVersion::V3
            } else {
                PlutusVersion::Other(raw.to_string())
            };
            return ScriptKind::Plutus(version);
        }
        if raw == "timelock" {
            return ScriptKind::Timelock;
        }
        ScriptKind::Other(raw.to_string())
    }
}

/// The provider's description of the script behind a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptDescriptor {
    /// Type string exactly as the provider returned it
    pub script_type: String,
    pub kind: ScriptKind,
    pub raw: Value,
}

impl ScriptDescriptor {
    pub fn from_json(raw: Value) -> Result<Self, FetchError> {
        let script_type = raw
            .get("type")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                FetchError::Decode("script response has no non-empty `type` field".to_string())
            })?
            .to_string();

        Ok(Self {
            kind: ScriptKind::from_type_str(&script_type),
            script_type,
            raw,
        })
    }
}

/// Top-level rule of a native (timelock) script
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    AllOf,
    AnyOf,
    AtLeast { required: u64 },
    Signature,
    TimeBound,
    Other(String),
}

impl RuleKind {
    fn from_rule(rule: &Value) -> Option<Self> {
        let kind = rule.get("type")?.as_str()?;
        Some(match kind {
            "all" | "all-of" | "allOf" => RuleKind::AllOf,
            "any" | "any-of" | "anyOf" => RuleKind::AnyOf,
            "atLeast" | "at-least" | "at-least-n" => RuleKind::AtLeast {
                required: rule.get("required").and_then(Value::as_u64).unwrap_or(0),
            },
            "sig" => RuleKind::Signature,
            "before" | "after" => RuleKind::TimeBound,
            other => RuleKind::Other(other.to_string()),
        })
    }
}

/// Expanded rule structure of a timelock script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelockRules {
    pub kind: RuleKind,
    /// Number of signature leaves anywhere in the rule tree
    pub signer_count: usize,
    pub raw: Value,
}

impl TimelockRules {
    /// Parse the provider's native script JSON
    ///
    /// Accepts both the provider envelope `{"json": {...}}` and a bare rule
    /// object.
    pub fn from_json(raw: Value) -> Result<Self, FetchError> {
        let rules = match raw.get("json") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => raw,
        };

        let kind = RuleKind::from_rule(&rules).ok_or_else(|| {
            FetchError::Decode("timelock rules have no `type` field".to_string())
        })?;

        Ok(Self {
            kind,
            signer_count: count_signers(&rules),
            raw: rules,
        })
    }

    pub fn is_multisig(&self) -> bool {
        self.kind == RuleKind::AllOf
    }
}

fn count_signers(rule: &Value) -> usize {
    let own = usize::from(rule.get("type").and_then(Value::as_str) == Some("sig"));
    let nested: usize = rule
        .get("scripts")
        .and_then(Value::as_array)
        .map(|scripts| scripts.iter().map(count_signers).sum())
        .unwrap_or(0);
    own + nested
}
