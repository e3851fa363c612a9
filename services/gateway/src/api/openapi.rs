//! OpenAPI schema aggregation for the gateway API.
use crate::api::types::{AuthContextBody, ErrorResponse, HealthStatus, SeedResponse};
use crate::api::{authz, bootstrap, system};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "eventhub-gateway",
        version = "v1",
        description = "EventHub request authentication and permission API"
    ),
    paths(system::system_health, authz::check, bootstrap::seed),
    components(schemas(HealthStatus, ErrorResponse, AuthContextBody, SeedResponse)),
    tags(
        (name = "system", description = "Health probes"),
        (name = "authz", description = "Authentication and permission checks"),
        (name = "bootstrap", description = "Internal permission seeding")
    )
)]
pub struct ApiDoc;

pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/v1/system/health",
            "/v1/authz/check",
            "/internal/permissions/seed",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
