use crate::{AuthzError, AuthzResult, Conditions, Role};
use serde::{Deserialize, Serialize};

const PK_PREFIX: &str = "PERMISSION#";
const SK_PREFIX: &str = "ROLE#";

/// Exact lookup key for a permission record.
///
/// Stored as a partition key `PERMISSION#{resource}:{action}` and a sort key
/// `ROLE#{role}`, so each `(resource, action, role)` maps to one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionKey {
    pub resource: String,
    pub action: String,
    pub role: Role,
}

impl PermissionKey {
    pub fn new(resource: impl Into<String>, action: impl Into<String>, role: Role) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            role,
        }
    }

    pub fn pk(&self) -> String {
        format!("{PK_PREFIX}{}:{}", self.resource, self.action)
    }

    pub fn sk(&self) -> String {
        format!("{SK_PREFIX}{}", self.role)
    }

    pub fn parse(pk: &str, sk: &str) -> AuthzResult<Self> {
        let (resource, action) = pk
            .strip_prefix(PK_PREFIX)
            .and_then(|rest| rest.split_once(':'))
            .filter(|(resource, action)| !resource.is_empty() && !action.is_empty())
            .ok_or_else(|| AuthzError::InvalidPermissionKey(pk.to_string()))?;
        let role = sk
            .strip_prefix(SK_PREFIX)
            .ok_or_else(|| AuthzError::InvalidPermissionKey(sk.to_string()))?
            .parse::<Role>()?;
        Ok(Self::new(resource, action, role))
    }
}

/// One persisted grant (or explicit refusal) for a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub resource: String,
    pub action: String,
    pub role: Role,
    pub allowed: bool,
    #[serde(default)]
    pub conditions: Conditions,
}

impl PermissionRecord {
    pub fn allowed(
        resource: impl Into<String>,
        action: impl Into<String>,
        role: Role,
        conditions: Conditions,
    ) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            role,
            allowed: true,
            conditions,
        }
    }

    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(self.resource.clone(), self.action.clone(), self.role)
    }
}
