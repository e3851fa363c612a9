//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the success and error envelopes returned to clients, plus the
//! payload shapes used for OpenAPI schema generation.
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    /// `memory`, `postgres`, or `fallback` when no store is configured.
    pub permissions_backend: String,
}

/// Error envelope: `{ "success": false, "error": "...", "code": "..." }`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub error: String,
}

/// Success envelope: `{ "success": true, "message": "...", "data": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AuthzCheckQuery {
    /// Resource name, for example `volunteer_tasks`.
    #[param(required = true)]
    pub resource: Option<String>,
    /// Action name, for example `update`.
    #[param(required = true)]
    pub action: Option<String>,
    /// Target resource id used by `own_only` and `assigned_only` rules.
    pub resource_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthContextBody {
    pub user_id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: String,
    pub groups: Vec<String>,
    pub organization: Option<String>,
}

impl From<eventhub_authz::AuthContext> for AuthContextBody {
    fn from(context: eventhub_authz::AuthContext) -> Self {
        Self {
            user_id: context.user_id,
            email: context.email,
            username: context.username,
            role: context.role.to_string(),
            groups: context.groups,
            organization: context.organization,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct SeedResponse {
    pub records: usize,
    pub batches: usize,
    pub backend: String,
}
