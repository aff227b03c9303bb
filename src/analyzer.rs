//! Policy analyzer
//!
//! Composes the verdict cache, the script provider and the classification
//! engine:
//!
//! cache read -> [hit] return
//!            -> [miss, no credential] fallback verdict (not cached)
//!            -> [miss] fetch -> classify -> cache write -> return
//!
//! `analyze` never fails. Timeouts and provider errors become verdicts with
//! `risk_level = UNKNOWN` and are not cached, so the next call recomputes.
//! Concurrent calls for the same policy are not coalesced; each may fetch
//! and the last cache write wins.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::cache::{VerdictCache, VerdictStore};
use crate::classify::classify;
use crate::config::{XrayConfig, FETCH_TIMEOUT};
use crate::error::{FetchError, XrayError};
use crate::metrics::XrayMetrics;
use crate::provider::{BlockfrostClient, ScriptKind, ScriptProvider, TimelockRules};
use crate::verdict::Verdict;

pub struct PolicyAnalyzer {
    cache: VerdictCache,
    /// `None` when no provider credential is configured
    provider: Option<Arc<dyn ScriptProvider>>,
    metrics: Arc<XrayMetrics>,
}

impl PolicyAnalyzer {
    pub fn new(
        store: Arc<dyn VerdictStore>,
        provider: Option<Arc<dyn ScriptProvider>>,
        metrics: Arc<XrayMetrics>,
    ) -> Self {
        Self {
            cache: VerdictCache::new(store),
            provider,
            metrics,
        }
    }

    /// Build an analyzer backed by the Blockfrost client when a credential is set
    pub fn from_config(
        config: &XrayConfig,
        store: Arc<dyn VerdictStore>,
    ) -> Result<Self, XrayError> {
        let metrics = Arc::new(XrayMetrics::new());
        let provider = BlockfrostClient::from_config(config, metrics.clone())?
            .map(|client| Arc::new(client) as Arc<dyn ScriptProvider>);
        Ok(Self::new(store, provider, metrics))
    }

    pub fn metrics(&self) -> &Arc<XrayMetrics> {
        &self.metrics
    }

    /// True when a provider is configured (not in fallback mode)
    pub fn is_live(&self) -> bool {
        self.provider.is_some()
    }

    /// Analyze a policy, serving from cache when a fresh verdict exists
    pub async fn analyze(&self, policy_id: &str) -> Verdict {
        match self.cache.read(policy_id).await {
            Ok(Some(verdict)) => {
                self.metrics.record_cache_hit();
                info!(policy_id, "cache hit");
                return verdict;
            }
            Ok(None) => {
                self.metrics.record_cache_miss();
                info!(policy_id, "cache miss");
            }
            Err(e) => {
                self.metrics.record_cache_read_error();
                self.metrics.record_cache_miss();
                warn!(policy_id, error = %e, "cache read failed, treating as miss");
            }
        }

        let Some(provider) = self.provider.as_deref() else {
            self.metrics.record_fallback();
            warn!(policy_id, "provider credential missing, using fallback verdict");
            return Verdict::fallback(policy_id);
        };

        match self.fetch_and_classify(provider, policy_id).await {
            Ok(verdict) => {
                info!(
                    policy_id,
                    asset_type = %verdict.asset_type,
                    risk_level = %verdict.risk_level,
                    "policy classified"
                );
                if let Err(e) = self.cache.write(policy_id, &verdict).await {
                    self.metrics.record_cache_write_error();
                    warn!(policy_id, error = %e, "cache write failed, verdict not persisted");
                }
                verdict
            }
            Err(e) if e.is_timeout() => {
                self.metrics.record_error();
                error!(policy_id, error = %e, "analysis timed out");
                Verdict::timed_out(policy_id)
            }
            Err(e) => {
                self.metrics.record_error();
                error!(policy_id, error = %e, "analysis failed");
                Verdict::failed(policy_id, &e)
            }
        }
    }

    async fn fetch_and_classify(
        &self,
        provider: &dyn ScriptProvider,
        policy_id: &str,
    ) -> Result<Verdict, FetchError> {
        let descriptor = bounded(
            format!("/scripts/{}", policy_id),
            provider.fetch_script(policy_id),
        )
        .await?;

        let expanded = match &descriptor {
            Some(d) if d.kind == ScriptKind::Timelock => {
                self.expand_timelock(provider, policy_id).await
            }
            _ => None,
        };

        Ok(classify(policy_id, descriptor.as_ref(), expanded.as_ref()))
    }

    /// Second fetch for timelock scripts
    ///
    /// A failure is counted as an error but still yields a verdict built from
    /// the raw descriptor.
    async fn expand_timelock(
        &self,
        provider: &dyn ScriptProvider,
        policy_id: &str,
    ) -> Option<TimelockRules> {
        match bounded(
            format!("/scripts/{}/json", policy_id),
            provider.fetch_timelock_rules(policy_id),
        )
        .await
        {
            Ok(rules) => rules,
            Err(e) => {
                self.metrics.record_error();
                warn!(policy_id, error = %e, "timelock expansion failed, using raw descriptor");
                None
            }
        }
    }
}

/// Apply the fixed fetch budget to one provider call
async fn bounded<T, F>(endpoint: String, call: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(FETCH_TIMEOUT, call)
        .await
        .map_err(|_| FetchError::Timeout { endpoint })?
}
