//! Script metadata provider client
//!
//! Single-attempt HTTP client for the Blockfrost script endpoints. A 404 is
//! a meaningful answer ("no script governs this policy") and comes back as
//! `Ok(None)`; every other non-success status is a `FetchError`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::types::{ScriptDescriptor, TimelockRules};
use crate::config::{XrayConfig, FETCH_TIMEOUT};
use crate::error::{FetchError, XrayError};
use crate::metrics::XrayMetrics;

/// Header carrying the provider credential
const PROJECT_ID_HEADER: &str = "project_id";

/// Source of script metadata for a policy
#[async_trait]
pub trait ScriptProvider: Send + Sync {
    /// `GET /scripts/{policy_id}`; `Ok(None)` when the provider has no script
    async fn fetch_script(&self, policy_id: &str)
        -> Result<Option<ScriptDescriptor>, FetchError>;

    /// `GET /scripts/{policy_id}/json`; expanded rules of a timelock script
    async fn fetch_timelock_rules(
        &self,
        policy_id: &str,
    ) -> Result<Option<TimelockRules>, FetchError>;
}

/// Blockfrost API client
pub struct BlockfrostClient {
    http: Client,
    base_url: Url,
    project_id: String,
    metrics: Arc<XrayMetrics>,
}

impl BlockfrostClient {
    /// Create a client with the given credential
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        metrics: Arc<XrayMetrics>,
    ) -> Result<Self, XrayError> {
        Self::build(base_url.into(), project_id.into(), metrics, FETCH_TIMEOUT)
    }

    /// Create a client from configuration; `None` when no credential is set
    pub fn from_config(
        config: &XrayConfig,
        metrics: Arc<XrayMetrics>,
    ) -> Result<Option<Self>, XrayError> {
        config
            .project_id
            .as_ref()
            .map(|project_id| Self::new(config.provider_url.clone(), project_id.clone(), metrics))
            .transpose()
    }

    fn build(
        base_url: String,
        project_id: String,
        metrics: Arc<XrayMetrics>,
        timeout: Duration,
    ) -> Result<Self, XrayError> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| {
            XrayError::Config(format!("invalid provider base URL {:?}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(XrayError::Config(format!(
                "provider base URL {} cannot carry a path",
                base_url
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| XrayError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            project_id,
            metrics,
        })
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Network(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Single GET; `Ok(None)` on 404
    async fn get_json_optional(&self, segments: &[&str]) -> Result<Option<Value>, FetchError> {
        self.metrics.record_api_call();
        let url = self.endpoint_url(segments)?;
        let endpoint = url.path();
        debug!(endpoint, "calling script provider");

        let response = self
            .http
            .get(url.clone())
            .header(PROJECT_ID_HEADER, &self.project_id)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| map_reqwest_error(endpoint, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(endpoint, "provider returned 404");
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(endpoint, e))?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "provider returned error status");
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| FetchError::Decode(format!("{} from {}", e, endpoint)))
    }
}

#[async_trait]
impl ScriptProvider for BlockfrostClient {
    async fn fetch_script(
        &self,
        policy_id: &str,
    ) -> Result<Option<ScriptDescriptor>, FetchError> {
        self.get_json_optional(&["scripts", policy_id])
            .await?
            .map(ScriptDescriptor::from_json)
            .transpose()
    }

    async fn fetch_timelock_rules(
        &self,
        policy_id: &str,
    ) -> Result<Option<TimelockRules>, FetchError> {
        self.get_json_optional(&["scripts", policy_id, "json"])
            .await?
            .map(TimelockRules::from_json)
            .transpose()
    }
}

fn map_reqwest_error(endpoint: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout {
            endpoint: endpoint.to_string(),
        };
    }
    if err.is_body() || err.is_decode() {
        return FetchError::Decode(err.to_string());
    }
    FetchError::Network(err.to_string())
}
