use crate::Role;
use serde::{Deserialize, Serialize};

/// Caller identity resolved from a verified credential.
///
/// Built fresh for every request and never persisted. `role` is derived from
/// `groups` at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub groups: Vec<String>,
    pub role: Role,
    pub organization: Option<String>,
    /// Provider-side role attribute. Informational only; never used for decisions.
    pub custom_role: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, groups: Vec<String>) -> Self {
        let role = Role::from_groups(&groups);
        Self {
            user_id: user_id.into(),
            email: None,
            username: None,
            groups,
            role,
            organization: None,
            custom_role: None,
        }
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization;
        self
    }

    pub fn with_custom_role(mut self, custom_role: Option<String>) -> Self {
        self.custom_role = custom_role;
        self
    }

    pub fn auth_context(&self) -> AuthContext {
        AuthContext {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            groups: self.groups.clone(),
            organization: self.organization.clone(),
        }
    }
}

/// Caller attributes handed to record handlers for stamping `createdBy` and
/// `updatedBy` style fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Role,
    pub groups: Vec<String>,
    pub organization: Option<String>,
}
