//! Request authentication and authorization in one call.
//!
//! # Purpose
//! Record handlers call [`Authenticator::authenticate_request`] with the
//! resource and action they serve. The result says whether the caller proved
//! who they are (401 otherwise) and whether their role may act (403
//! otherwise), and carries the auth context on success.
use crate::auth::cognito::IdentityResolver;
use crate::auth::request::{RequestContext, ResourceIdExtractor, bearer_token};
use crate::observability;
use eventhub_authz::{AuthContext, Identity, PermissionEvaluator};
use serde::Serialize;
use std::sync::Arc;

pub const NO_AUTHORIZATION_HEADER: &str = "No authorization header provided";
pub const NO_TOKEN: &str = "No token provided";

/// Outcome of [`Authenticator::authenticate_request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
    pub is_authenticated: bool,
    pub is_authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_context: Option<AuthContext>,
}

impl AuthOutcome {
    fn unauthenticated(message: impl Into<String>) -> Self {
        observability::record_auth_outcome("unauthenticated");
        Self {
            is_authenticated: false,
            is_authorized: false,
            error: Some(message.into()),
            status_code: Some(401),
            user: None,
            auth_context: None,
        }
    }

    fn forbidden(identity: Identity, resource: &str, action: &str) -> Self {
        observability::record_auth_outcome("forbidden");
        Self {
            is_authenticated: true,
            is_authorized: false,
            error: Some(format!(
                "Insufficient permissions for {action} on {resource}"
            )),
            status_code: Some(403),
            user: Some(identity),
            auth_context: None,
        }
    }

    fn authorized(identity: Identity) -> Self {
        observability::record_auth_outcome("allowed");
        let auth_context = identity.auth_context();
        Self {
            is_authenticated: true,
            is_authorized: true,
            error: None,
            status_code: None,
            user: Some(identity),
            auth_context: Some(auth_context),
        }
    }
}

#[derive(Clone)]
pub struct Authenticator {
    resolver: Arc<dyn IdentityResolver>,
    evaluator: PermissionEvaluator,
}

impl Authenticator {
    pub fn new(resolver: Arc<dyn IdentityResolver>, evaluator: PermissionEvaluator) -> Self {
        Self {
            resolver,
            evaluator,
        }
    }

    pub fn evaluator(&self) -> &PermissionEvaluator {
        &self.evaluator
    }

    /// Authenticate the caller of `request` and check `action` on `resource`.
    ///
    /// When `extractor` is given it runs after the identity is resolved and
    /// supplies the resource id used by `own_only` and `assigned_only`.
    pub async fn authenticate_request(
        &self,
        request: &RequestContext,
        resource: &str,
        action: &str,
        extractor: Option<&ResourceIdExtractor>,
    ) -> AuthOutcome {
        match self.authenticate(request).await {
            Ok(identity) => {
                self.authorize(request, identity, resource, action, extractor)
                    .await
            }
            Err(outcome) => outcome,
        }
    }

    /// Resolve the bearer credential of `request` into an identity.
    ///
    /// # Errors
    /// Returns the 401 outcome for a missing header, an empty token, or a
    /// credential the resolver rejects.
    pub async fn authenticate(&self, request: &RequestContext) -> Result<Identity, AuthOutcome> {
        let Some(header) = request.authorization() else {
            return Err(AuthOutcome::unauthenticated(NO_AUTHORIZATION_HEADER));
        };
        let Some(token) = bearer_token(header) else {
            return Err(AuthOutcome::unauthenticated(NO_TOKEN));
        };

        self.resolver.resolve(token).await.map_err(|err| {
            tracing::info!(error = %err, "authentication failed");
            AuthOutcome::unauthenticated(format!("Authentication failed: {err}"))
        })
    }

    /// Check `action` on `resource` for an already authenticated identity.
    pub async fn authorize(
        &self,
        request: &RequestContext,
        identity: Identity,
        resource: &str,
        action: &str,
        extractor: Option<&ResourceIdExtractor>,
    ) -> AuthOutcome {
        let resource_id = extractor.and_then(|extract| extract(request, &identity));
        if !self
            .evaluator
            .check(&identity, resource, action, resource_id.as_deref())
            .await
        {
            tracing::info!(
                user_id = %identity.user_id,
                role = %identity.role,
                resource,
                action,
                "permission denied"
            );
            return AuthOutcome::forbidden(identity, resource, action);
        }

        AuthOutcome::authorized(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cognito::OidcError;
    use crate::auth::request::{path_param, user_id_from_path};
    use async_trait::async_trait;
    use axum::http::{HeaderMap, HeaderValue};

    /// Accepts tokens of the form `user:group1,group2`.
    struct StaticResolver;

    #[async_trait]
    impl IdentityResolver for StaticResolver {
        async fn resolve(&self, token: &str) -> Result<Identity, OidcError> {
            let (user, groups) = token
                .split_once(':')
                .ok_or_else(|| OidcError::InvalidClaim("token format".to_string()))?;
            let groups = groups
                .split(',')
                .filter(|group| !group.is_empty())
                .map(str::to_string)
                .collect();
            Ok(Identity::new(user, groups).with_email(Some(format!("{user}@example.com"))))
        }
    }

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(StaticResolver), PermissionEvaluator::fallback())
    }

    fn request(authorization: Option<&'static str>) -> RequestContext {
        let mut headers = HeaderMap::new();
        if let Some(value) = authorization {
            headers.insert("authorization", HeaderValue::from_static(value));
        }
        RequestContext::new(headers)
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let outcome = authenticator()
            .authenticate_request(&request(None), "events", "read", None)
            .await;
        assert!(!outcome.is_authenticated);
        assert!(!outcome.is_authorized);
        assert_eq!(outcome.status_code, Some(401));
        assert_eq!(outcome.error.as_deref(), Some(NO_AUTHORIZATION_HEADER));
    }

    #[tokio::test]
    async fn empty_bearer_is_unauthenticated() {
        let outcome = authenticator()
            .authenticate_request(&request(Some("Bearer ")), "events", "read", None)
            .await;
        assert_eq!(outcome.status_code, Some(401));
        assert_eq!(outcome.error.as_deref(), Some(NO_TOKEN));
    }

    #[tokio::test]
    async fn resolver_failure_is_unauthenticated() {
        let outcome = authenticator()
            .authenticate_request(&request(Some("Bearer garbage")), "events", "read", None)
            .await;
        assert_eq!(outcome.status_code, Some(401));
        assert!(!outcome.is_authenticated);
        assert!(
            outcome
                .error
                .as_deref()
                .unwrap_or_default()
                .starts_with("Authentication failed: ")
        );
    }

    #[tokio::test]
    async fn denied_permission_is_forbidden() {
        let outcome = authenticator()
            .authenticate_request(
                &request(Some("Bearer s1:student")),
                "admin_stats",
                "read",
                None,
            )
            .await;
        assert!(outcome.is_authenticated);
        assert!(!outcome.is_authorized);
        assert_eq!(outcome.status_code, Some(403));
        assert_eq!(
            outcome.error.as_deref(),
            Some("Insufficient permissions for read on admin_stats")
        );
        assert_eq!(outcome.user.map(|user| user.user_id).as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn allowed_request_carries_auth_context() {
        let outcome = authenticator()
            .authenticate_request(&request(Some("bearer t1:teacher")), "courses", "read", None)
            .await;
        assert!(outcome.is_authorized);
        assert_eq!(outcome.status_code, None);
        let context = outcome.auth_context.expect("auth context");
        assert_eq!(context.user_id, "t1");
        assert_eq!(context.email.as_deref(), Some("t1@example.com"));
    }

    #[tokio::test]
    async fn extractor_supplies_resource_id() {
        let by_task = path_param("taskId");
        let own = request(Some("Bearer u1:volunteer")).with_path_param("taskId", "u1");
        let outcome = authenticator()
            .authenticate_request(&own, "volunteer_tasks", "update", Some(by_task.as_ref()))
            .await;
        assert!(outcome.is_authorized);

        let other = request(Some("Bearer u1:volunteer")).with_path_param("taskId", "u2");
        let outcome = authenticator()
            .authenticate_request(&other, "volunteer_tasks", "update", Some(by_task.as_ref()))
            .await;
        assert_eq!(outcome.status_code, Some(403));
    }

    #[tokio::test]
    async fn own_only_without_extractor_denies() {
        let extractor = user_id_from_path();
        let req = request(Some("Bearer u1:volunteer"));
        let outcome = authenticator()
            .authenticate_request(&req, "volunteers", "read", Some(extractor.as_ref()))
            .await;
        assert_eq!(outcome.status_code, Some(403));
    }

    #[tokio::test]
    async fn authenticate_then_authorize_matches_combined_call() {
        let auth = authenticator();
        let req = request(Some("Bearer t1:teacher"));
        let identity = auth.authenticate(&req).await.expect("identity");
        assert_eq!(identity.user_id, "t1");
        let outcome = auth
            .authorize(&req, identity, "payments", "create", None)
            .await;
        assert_eq!(outcome.status_code, Some(403));

        let err = auth.authenticate(&request(None)).await.unwrap_err();
        assert_eq!(err.status_code, Some(401));
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let outcome = AuthOutcome::unauthenticated(NO_TOKEN);
        let value = serde_json::to_value(outcome).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "isAuthenticated": false,
                "isAuthorized": false,
                "error": "No token provided",
                "statusCode": 401
            })
        );
    }
}
