//! Policy X-Ray - on-chain minting policy classification
//!
//! Answers "what kind of asset policy is this, and how risky is it?" by
//! consulting an external script metadata provider, classifying the result
//! and caching the verdict for a fixed freshness window.
//!
//! ## Call chain
//! Policy ID -> Verdict Cache (read) -> [miss] -> Script Provider -> Classify
//! -> Verdict Cache (write) -> Verdict
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use policy_xray::{InMemoryVerdictStore, PolicyAnalyzer, XrayConfig};
//!
//! # async fn run() -> Result<(), policy_xray::XrayError> {
//! let config = XrayConfig::from_env()?;
//! let analyzer = PolicyAnalyzer::from_config(&config, Arc::new(InMemoryVerdictStore::new()))?;
//! let verdict = analyzer.analyze(&"a".repeat(56)).await;
//! println!("{} ({})", verdict.asset_type, verdict.risk_level);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Environment-driven configuration and fixed constants
pub mod config;

// Injected operational counters
pub mod metrics;

// Verdict record and risk levels
pub mod verdict;

// Script metadata provider (fetcher + normalized descriptor types)
pub mod provider;

// Verdict cache and its storage backends
pub mod cache;

// Classification engine - pure decision procedure
pub mod classify;

// Orchestrator composing cache, provider and classifier
pub mod analyzer;

// REST API (optional)
#[cfg(feature = "server")]
pub mod api;

pub use analyzer::PolicyAnalyzer;
pub use cache::{CacheEntry, InMemoryVerdictStore, VerdictCache, VerdictStore};
pub use classify::classify;
pub use config::{XrayConfig, FETCH_TIMEOUT, FRESHNESS_WINDOW};
pub use error::{FetchError, StoreError, XrayError};
pub use metrics::{MetricsSnapshot, XrayMetrics};
pub use provider::{
    BlockfrostClient, PlutusVersion, RuleKind, ScriptDescriptor, ScriptKind, ScriptProvider,
    TimelockRules,
};
pub use verdict::{validate_policy_id, RiskLevel, Verdict};

#[cfg(feature = "database")]
pub use cache::postgres::PgVerdictStore;
