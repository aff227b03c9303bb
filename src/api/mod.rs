//! REST API for policy X-Ray
//!
//! Thin axum layer over `PolicyAnalyzer`. The only request validation done
//! here is the policy id shape; analysis itself always answers 200 with a
//! verdict.

mod xray_routes;

pub use xray_routes::{create_xray_router, ErrorResponse, HealthResponse, XrayState};
