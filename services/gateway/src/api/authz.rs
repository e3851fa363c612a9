//! Authorization check endpoint.
//!
//! # Purpose
//! Lets upstream handlers and tooling ask "may the bearer of this token do
//! `action` on `resource`?" without embedding the gateway as a library. The
//! handler runs the same `authenticate_request` path record handlers use.
//!
//! # Security considerations
//! - The bearer token is never logged.
//! - The caller is authenticated before the query is validated, so an
//!   anonymous request always gets 401.
//! - Unknown resources or actions deny with 403; they are not validation
//!   errors, so callers cannot map out the rule table.
use crate::api::error::{ApiError, api_from_outcome, api_internal_message, api_validation_error};
use crate::api::types::{ApiSuccess, AuthContextBody, AuthzCheckQuery};
use crate::app::AppState;
use crate::auth::RequestContext;
use crate::auth::request::query_param;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;

pub const RESOURCE_ID_PARAM: &str = "resourceId";

#[utoipa::path(
    get,
    path = "/v1/authz/check",
    tag = "authz",
    params(AuthzCheckQuery),
    responses(
        (status = 200, description = "Caller is authorized; body carries the auth context", body = AuthContextBody),
        (status = 400, description = "Validation error", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AuthzCheckQuery>,
) -> Result<Json<ApiSuccess<AuthContextBody>>, ApiError> {
    let mut request = RequestContext::new(headers);
    if let Some(resource_id) = query.resource_id {
        request = request.with_query_param(RESOURCE_ID_PARAM, resource_id);
    }
    let identity = state
        .authenticator
        .authenticate(&request)
        .await
        .map_err(|outcome| {
            api_from_outcome(&outcome)
                .unwrap_or_else(|| api_internal_message("unauthenticated outcome without status"))
        })?;

    let resource = query.resource.as_deref().map(str::trim).unwrap_or_default();
    let action = query.action.as_deref().map(str::trim).unwrap_or_default();
    if resource.is_empty() || action.is_empty() {
        return Err(api_validation_error("resource and action are required"));
    }

    let extractor = query_param(RESOURCE_ID_PARAM);
    let outcome = state
        .authenticator
        .authorize(&request, identity, resource, action, Some(extractor.as_ref()))
        .await;

    if let Some(err) = api_from_outcome(&outcome) {
        return Err(err);
    }
    let context = outcome
        .auth_context
        .ok_or_else(|| api_internal_message("authorized outcome without auth context"))?;
    Ok(Json(ApiSuccess::new("Authorized", context.into())))
}
