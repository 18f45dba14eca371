//! Health check endpoint
//!
//! `GET /health` always answers 200 with a fixed status payload:
//!
//! ```json
//! {"status": "healthy", "service": "ScamShield File Validator"}
//! ```

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is up
    Healthy,
}

/// Health check response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: HealthStatus,

    /// Configured service name
    pub service: String,
}

impl HealthResponse {
    /// A healthy response for the named service
    #[must_use]
    pub fn healthy(service: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            service: service.into(),
        }
    }
}

/// Health check handler
#[allow(clippy::unused_async)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(&state.config().service.name))
}
