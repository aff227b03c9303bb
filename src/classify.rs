//! Classification engine
//!
//! Pure decision procedure from a fetched script description (or its
//! absence) to a verdict. The rules form a strict priority chain:
//!
//! 1. no script            -> Native Asset, LOW 10
//! 2. any Plutus version   -> Plutus Smart Contract, HIGH 85
//! 3. timelock             -> Native Timelock Script, LOW 15
//!    (expanded rule kind all-of -> Multi-Sig Script, MEDIUM 40)
//! 4. anything else        -> "Script: {type}", MEDIUM 50

use serde_json::json;

use crate::provider::{ScriptDescriptor, ScriptKind, TimelockRules};
use crate::verdict::{RiskLevel, Verdict};

/// Classify a policy
///
/// `expanded` is the timelock rule structure from the second provider call,
/// when it succeeded. It is ignored for non-timelock scripts.
pub fn classify(
    policy_id: &str,
    descriptor: Option<&ScriptDescriptor>,
    expanded: Option<&TimelockRules>,
) -> Verdict {
    let Some(descriptor) = descriptor else {
        return Verdict::new(
            policy_id,
            "Native Asset",
            RiskLevel::Low,
            10,
            json!({"note": "No script hash found on-chain, implies simple key policy."}),
            "Standard native asset locked by a private key, no script found on-chain.",
        );
    };

    match &descriptor.kind {
        ScriptKind::Plutus(_) => Verdict::new(
            policy_id,
            "Plutus Smart Contract",
            RiskLevel::High,
            85,
            descriptor.raw.clone(),
            "Complex smart contract. Code is compiled and opaque, requires audit.",
        ),
        ScriptKind::Timelock => match expanded {
            Some(rules) if rules.is_multisig() => Verdict::new(
                policy_id,
                "Multi-Sig Script",
                RiskLevel::Medium,
                40,
                rules.raw.clone(),
                "Requires multiple signatures, safer than a single key.",
            ),
            _ => Verdict::new(
                policy_id,
                "Native Timelock Script",
                RiskLevel::Low,
                15,
                expanded.map_or_else(|| descriptor.raw.clone(), |rules| rules.raw.clone()),
                "Transparent rules defined on-chain.",
            ),
        },
        ScriptKind::Other(script_type) => Verdict::new(
            policy_id,
            format!("Script: {}", script_type),
            RiskLevel::Medium,
            50,
            descriptor.raw.clone(),
            "Unrecognized script type.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const POLICY: &str = "policy";

    fn descriptor(script_type: &str) -> ScriptDescriptor {
        ScriptDescriptor::from_json(json!({"script_hash": POLICY, "type": script_type})).unwrap()
    }

    fn rules(value: serde_json::Value) -> TimelockRules {
        TimelockRules::from_json(value).unwrap()
    }

    #[test]
    fn test_absent_is_native_asset() {
        let verdict = classify(POLICY, None, None);
        assert_eq!(verdict.asset_type, "Native Asset");
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert_eq!(verdict.risk_score, 10);
        assert!(!verdict.cached);
        assert!(verdict.details["note"].is_string());
    }

    #[test]
    fn test_plutus_versions_are_high_risk() {
        for script_type in ["plutusV1", "plutusV2", "plutusV3", "PLUTUS"] {
            let d = descriptor(script_type);
            let verdict = classify(POLICY, Some(&d), None);
            assert_eq!(verdict.asset_type, "Plutus Smart Contract", "{script_type}");
            assert_eq!(verdict.risk_level, RiskLevel::High);
            assert_eq!(verdict.risk_score, 85);
            assert_eq!(verdict.details, d.raw);
        }
    }

    #[test]
    fn test_plutus_ignores_expanded_rules() {
        let d = descriptor("plutusV2");
        let all_of = rules(json!({"type": "all", "scripts": []}));
        let verdict = classify(POLICY, Some(&d), Some(&all_of));
        assert_eq!(verdict.asset_type, "Plutus Smart Contract");
    }

    #[test]
    fn test_timelock_without_expansion_uses_raw_descriptor() {
        let d = descriptor("timelock");
        let verdict = classify(POLICY, Some(&d), None);
        assert_eq!(verdict.asset_type, "Native Timelock Script");
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert_eq!(verdict.risk_score, 15);
        assert_eq!(verdict.details, d.raw);
    }

    #[test]
    fn test_timelock_any_of_keeps_base_verdict() {
        let d = descriptor("timelock");
        let any_of = rules(json!({"type": "any", "scripts": [
            {"type": "sig", "keyHash": "k1"},
            {"type": "sig", "keyHash": "k2"}
        ]}));
        let verdict = classify(POLICY, Some(&d), Some(&any_of));
        assert_eq!(verdict.asset_type, "Native Timelock Script");
        assert_eq!(verdict.details, any_of.raw);
    }

    #[test]
    fn test_timelock_all_of_is_multisig() {
        let d = descriptor("timelock");
        let all_of = rules(json!({"json": {"type": "all", "scripts": [
            {"type": "sig", "keyHash": "k1"},
            {"type": "sig", "keyHash": "k2"}
        ]}}));
        let verdict = classify(POLICY, Some(&d), Some(&all_of));
        assert_eq!(verdict.asset_type, "Multi-Sig Script");
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert_eq!(verdict.risk_score, 40);
        assert_eq!(verdict.details["type"], "all");
    }

    #[test]
    fn test_unknown_script_type() {
        let d = descriptor("native");
        let verdict = classify(POLICY, Some(&d), None);
        assert_eq!(verdict.asset_type, "Script: native");
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert_eq!(verdict.risk_score, 50);
        assert_eq!(verdict.explanation, "Unrecognized script type.");
    }

    #[test]
    fn test_timelock_casing_variant_is_unrecognized() {
        let d = descriptor("TimeLock");
        let verdict = classify(POLICY, Some(&d), None);
        assert_eq!(verdict.asset_type, "Script: TimeLock");
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert_eq!(verdict.risk_score, 50);
    }
}
