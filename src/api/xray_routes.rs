//! X-Ray API endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::analyzer::PolicyAnalyzer;
use crate::metrics::MetricsSnapshot;
use crate::verdict::{validate_policy_id, Verdict};

#[derive(Clone)]
pub struct XrayState {
    analyzer: Arc<PolicyAnalyzer>,
}

impl XrayState {
    pub fn new(analyzer: Arc<PolicyAnalyzer>) -> Self {
        Self { analyzer }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// "live" with a provider credential, "fallback" without
    pub mode: String,
}

/// GET /xray/:policy_id and GET /api/xray/:policy_id
async fn analyze_policy(
    State(state): State<XrayState>,
    Path(policy_id): Path<String>,
) -> Result<Json<Verdict>, (StatusCode, Json<ErrorResponse>)> {
    validate_policy_id(&policy_id).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(state.analyzer.analyze(&policy_id).await))
}

/// GET /api/metrics
async fn metrics(State(state): State<XrayState>) -> Json<MetricsSnapshot> {
    Json(state.analyzer.metrics().snapshot())
}

/// GET /api/health
async fn health(State(state): State<XrayState>) -> Json<HealthResponse> {
    let mode = if state.analyzer.is_live() {
        "live"
    } else {
        "fallback"
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        mode: mode.to_string(),
    })
}

/// Create router for X-Ray endpoints
pub fn create_xray_router(analyzer: Arc<PolicyAnalyzer>) -> Router {
    Router::new()
        .route("/xray/:policy_id", get(analyze_policy))
        .route("/api/xray/:policy_id", get(analyze_policy))
        .route("/api/metrics", get(metrics))
        .route("/api/health", get(health))
        .with_state(XrayState::new(analyzer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryVerdictStore;
    use crate::config::XrayConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn fallback_router() -> Router {
        let analyzer = PolicyAnalyzer::from_config(
            &XrayConfig::default(),
            Arc::new(InMemoryVerdictStore::new()),
        )
        .unwrap();
        create_xray_router(Arc::new(analyzer))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_returns_verdict_shape() {
        let policy_id = "a".repeat(56);
        let (status, body) = get_json(fallback_router(), &format!("/xray/{}", policy_id)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["policy_id"], policy_id.as_str());
        assert_eq!(body["type"], "Unknown");
        assert_eq!(body["risk_level"], "LOW");
        assert_eq!(body["risk_score"], 10);
        assert_eq!(body["cached"], false);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_policy_id_rejected() {
        let (status, body) = get_json(fallback_router(), "/api/xray/not-a-policy").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid policy id"));
    }

    #[tokio::test]
    async fn test_health_reports_fallback_mode() {
        let (status, body) = get_json(fallback_router(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["mode"], "fallback");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (status, body) = get_json(fallback_router(), "/api/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["api_calls"], 0);
        assert_eq!(body["fallbacks"], 0);
    }
}
