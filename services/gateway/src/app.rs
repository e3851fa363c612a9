//! Gateway HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum routers and defines the shared application state injected
//! into handlers.
use crate::api;
use crate::auth::Authenticator;
use axum::Router;
use eventhub_authz::PermissionStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    /// `None` when the gateway answers from the built-in matrix only.
    pub permission_store: Option<Arc<dyn PermissionStore>>,
    pub bootstrap_enabled: bool,
    pub bootstrap_token: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version()
            )
        });

    Router::new()
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route("/v1/authz/check", axum::routing::get(api::authz::check))
        .route(
            "/v1/openapi.json",
            axum::routing::get(api::openapi::openapi_json),
        )
        .layer(trace_layer)
        .with_state(state)
}

pub fn build_bootstrap_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/internal/permissions/seed",
            axum::routing::post(api::bootstrap::seed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
