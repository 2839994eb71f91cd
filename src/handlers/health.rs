use axum::Json;
use serde::Serialize;

use crate::version::GIT_VERSION;

/// Health check body. Reports the build it is running.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    git_version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        git_version: GIT_VERSION,
    })
}
