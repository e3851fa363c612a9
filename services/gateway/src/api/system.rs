//! System/health API handlers.
//!
//! # Purpose and responsibility
//! Lightweight health endpoint for probes.
//!
//! # Key invariants and assumptions
//! - Health checks must be fast and side-effect free.
//! - A gateway without a permission store is healthy; it answers from the
//!   built-in matrix.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

pub const FALLBACK_BACKEND: &str = "fallback";

#[utoipa::path(
    get,
    path = "/v1/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Gateway health", body = HealthStatus),
        (status = 500, description = "Permission store unavailable", body = crate::api::types::ErrorResponse)
    )
)]
/// Return gateway health status.
///
/// # Errors
/// - Returns 500 if the permission store health check fails.
pub(crate) async fn system_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, ApiError> {
    let backend = match &state.permission_store {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                return Err(api_internal("permission store unavailable", &err));
            }
            store.backend_name()
        }
        None => FALLBACK_BACKEND,
    };
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        permissions_backend: backend.to_string(),
    }))
}
