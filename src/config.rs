//! Runtime configuration
//!
//! Values that vary per deployment come from the environment. The fetch
//! timeout and the cache freshness window are fixed constants.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::XrayError;

/// Per-call budget for every outbound provider request
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Maximum age of a cached verdict before it is treated as stale
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_PROVIDER_URL: &str = "https://cardano-mainnet.blockfrost.io/api/v0";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Policy X-Ray configuration
#[derive(Clone)]
pub struct XrayConfig {
    /// Base URL of the script metadata provider
    pub provider_url: String,
    /// Provider credential; `None` puts the analyzer in fallback mode
    pub project_id: Option<String>,
    /// Postgres URL for the verdict store; `None` uses the in-memory store
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
}

impl XrayConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, XrayError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, XrayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider_url =
            non_blank("BLOCKFROST_URL").unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string());
        url::Url::parse(&provider_url).map_err(|e| {
            XrayError::Config(format!("BLOCKFROST_URL is not a valid URL: {}", e))
        })?;

        let bind_addr = non_blank("XRAY_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e| XrayError::Config(format!("XRAY_BIND_ADDR is invalid: {}", e)))?;

        Ok(Self {
            provider_url,
            project_id: non_blank("BLOCKFROST_PROJECT_ID"),
            database_url: non_blank("DATABASE_URL"),
            bind_addr,
        })
    }
}

impl Default for XrayConfig {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            project_id: None,
            database_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

// Never print the credential or database password.
impl fmt::Debug for XrayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XrayConfig")
            .field("provider_url", &self.provider_url)
            .field("project_id", &self.project_id.as_ref().map(|_| "***"))
            .field(
                "database_url",
                &self.database_url.as_deref().map(mask_database_url),
            )
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

/// Mask the password portion of a database URL for logging
pub fn mask_database_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}
