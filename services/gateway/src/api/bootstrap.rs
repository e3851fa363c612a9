//! Bootstrap API handlers.
//!
//! # Purpose
//! Seeds the default permission set into the configured store. Served only on
//! the internal bootstrap listener and guarded by a shared token.
use crate::api::error::{
    ApiError, api_internal, api_internal_message, api_not_enabled, api_unauthorized,
};
use crate::api::types::SeedResponse;
use crate::app::AppState;
use crate::observability;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use eventhub_authz::seed_permissions;

pub const BOOTSTRAP_TOKEN_HEADER: &str = "X-EventHub-Bootstrap-Token";

#[utoipa::path(
    post,
    path = "/internal/permissions/seed",
    tag = "bootstrap",
    responses(
        (status = 200, description = "Permissions seeded", body = SeedResponse),
        (status = 401, description = "Unauthorized", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Not enabled", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Seeding failed", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn seed(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SeedResponse>, ApiError> {
    if !state.bootstrap_enabled {
        return Err(api_not_enabled("bootstrap not enabled"));
    }

    ensure_bootstrap_authorized(&state, &headers)?;

    let Some(store) = state.permission_store.as_ref() else {
        return Err(api_not_enabled("no permission store configured"));
    };

    let report = seed_permissions(store.as_ref())
        .await
        .map_err(|err| api_internal("failed to seed permissions", &err))?;
    observability::record_permissions_seeded(report.records);
    tracing::info!(
        records = report.records,
        batches = report.batches,
        backend = store.backend_name(),
        "permissions seeded via bootstrap"
    );

    Ok(Json(SeedResponse {
        records: report.records,
        batches: report.batches,
        backend: store.backend_name().to_string(),
    }))
}

fn ensure_bootstrap_authorized(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = match headers.get(BOOTSTRAP_TOKEN_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| api_unauthorized("invalid bootstrap token"))?,
        None => return Err(api_unauthorized("missing bootstrap token")),
    };

    let expected = state
        .bootstrap_token
        .as_ref()
        .ok_or_else(|| api_internal_message("bootstrap token missing"))?;

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        return Err(api_unauthorized("invalid bootstrap token"));
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}
