use crate::{
    Decision, DenyReason, FallbackMatrix, Identity, PermissionKey, PermissionRecord,
    PermissionStore,
};
use std::sync::Arc;

/// Decides whether an identity may perform an action on a resource.
///
/// With a permission store configured every check is an exact-key lookup for
/// `(resource, action, role)` and a missing record denies. Without one the
/// [`FallbackMatrix`] answers. Store failures deny and are logged; they never
/// surface to the caller as errors.
#[derive(Clone)]
pub struct PermissionEvaluator {
    store: Option<Arc<dyn PermissionStore>>,
    matrix: Arc<FallbackMatrix>,
}

impl PermissionEvaluator {
    pub fn new(store: Option<Arc<dyn PermissionStore>>, matrix: FallbackMatrix) -> Self {
        Self {
            store,
            matrix: Arc::new(matrix),
        }
    }

    pub fn with_store(store: Arc<dyn PermissionStore>) -> Self {
        Self::new(Some(store), FallbackMatrix::default())
    }

    pub fn fallback() -> Self {
        Self::new(None, FallbackMatrix::default())
    }

    pub fn uses_store(&self) -> bool {
        self.store.is_some()
    }

    pub async fn check(
        &self,
        identity: &Identity,
        resource: &str,
        action: &str,
        resource_id: Option<&str>,
    ) -> bool {
        self.decide(identity, resource, action, resource_id)
            .await
            .is_allowed()
    }

    pub async fn decide(
        &self,
        identity: &Identity,
        resource: &str,
        action: &str,
        resource_id: Option<&str>,
    ) -> Decision {
        let decision = match &self.store {
            Some(store) => {
                let key = PermissionKey::new(resource, action, identity.role);
                match store.get_permission(&key).await {
                    Ok(Some(record)) => decide_record(&key, &record, identity, resource_id),
                    Ok(None) => Decision::Deny(DenyReason::NoRule),
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            backend = store.backend_name(),
                            resource,
                            action,
                            role = %identity.role,
                            "permission lookup failed"
                        );
                        Decision::Deny(DenyReason::LookupFailed)
                    }
                }
            }
            None => match self.matrix.lookup(identity.role, resource, action) {
                Some(conditions) => conditions.evaluate(&identity.user_id, resource_id),
                None => Decision::Deny(DenyReason::NoRule),
            },
        };

        if let Decision::Deny(reason) = decision {
            tracing::debug!(
                user_id = %identity.user_id,
                role = %identity.role,
                resource,
                action,
                reason = %reason,
                "permission denied"
            );
        }
        decision
    }
}

fn decide_record(
    key: &PermissionKey,
    record: &PermissionRecord,
    identity: &Identity,
    resource_id: Option<&str>,
) -> Decision {
    if record.key() != *key {
        tracing::error!(
            pk = %key.pk(),
            sk = %key.sk(),
            "permission record does not match its key"
        );
        return Decision::Deny(DenyReason::LookupFailed);
    }
    if !record.allowed {
        return Decision::Deny(DenyReason::Disallowed);
    }
    record.conditions.evaluate(&identity.user_id, resource_id)
}
