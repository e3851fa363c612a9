//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every endpoint returns the
//! same `{ success: false, code, error }` envelope.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
use crate::api::types::ErrorResponse;
use crate::auth::AuthOutcome;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use eventhub_authz::PermissionStoreError;

/// Structured API error returned by handlers.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            success: false,
            code: code.to_string(),
            error: message.to_string(),
        },
    }
}

/// Build a 404 error for disabled features.
pub fn api_not_enabled(message: &str) -> ApiError {
    // Use NOT_FOUND to avoid exposing disabled feature presence.
    api_error(StatusCode::NOT_FOUND, "not_enabled", message)
}

/// Build a 500 Internal Server Error from a store error.
///
/// Logs the store error and returns a generic internal error response.
pub fn api_internal(message: &str, err: &PermissionStoreError) -> ApiError {
    tracing::error!(error = %err, "permission store error");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

pub fn api_internal_message(message: &str) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 401 Unauthorized error.
pub fn api_unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Build a 403 Forbidden error.
pub fn api_forbidden(message: &str) -> ApiError {
    api_error(StatusCode::FORBIDDEN, "forbidden", message)
}

/// Build a 400 Bad Request validation error.
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Map a failed [`AuthOutcome`] onto the matching HTTP error.
///
/// Returns `None` for an authorized outcome.
pub fn api_from_outcome(outcome: &AuthOutcome) -> Option<ApiError> {
    if outcome.is_authorized {
        return None;
    }
    let message = outcome.error.as_deref().unwrap_or("Unauthorized");
    if outcome.is_authenticated {
        Some(api_forbidden(message))
    } else {
        Some(api_unauthorized(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_helpers_build_expected_codes() {
        let not_enabled = api_not_enabled("disabled");
        assert_eq!(not_enabled.status, StatusCode::NOT_FOUND);
        assert_eq!(not_enabled.body.code, "not_enabled");
        assert!(!not_enabled.body.success);

        let internal = api_internal_message("oops");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.body.code, "internal");

        let unauthorized = api_unauthorized("nope");
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unauthorized.body.code, "unauthorized");

        let forbidden = api_forbidden("nope");
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
        assert_eq!(forbidden.body.code, "forbidden");

        let validation = api_validation_error("bad");
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.code, "validation_error");
    }

    #[test]
    fn api_internal_logs_and_wraps_store_error() {
        let err = PermissionStoreError::Unavailable("boom".to_string());
        let api = api_internal("seeding failed", &err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.code, "internal");
        assert_eq!(api.body.error, "seeding failed");
    }

    #[test]
    fn outcome_maps_to_status() {
        let unauthenticated = AuthOutcome {
            is_authenticated: false,
            is_authorized: false,
            error: Some("No token provided".to_string()),
            status_code: Some(401),
            user: None,
            auth_context: None,
        };
        let err = api_from_outcome(&unauthenticated).expect("error");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.body.error, "No token provided");

        let forbidden = AuthOutcome {
            is_authenticated: true,
            ..unauthenticated.clone()
        };
        assert_eq!(
            api_from_outcome(&forbidden).expect("error").status,
            StatusCode::FORBIDDEN
        );

        let allowed = AuthOutcome {
            is_authenticated: true,
            is_authorized: true,
            ..unauthenticated
        };
        assert!(api_from_outcome(&allowed).is_none());
    }
}
