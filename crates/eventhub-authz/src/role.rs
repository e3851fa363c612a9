use crate::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};

/// Coarse permission tier carried by every identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Teacher,
    Volunteer,
    #[default]
    Student,
}

/// Roles in precedence order, highest first.
pub const ROLE_HIERARCHY: [Role; 4] = [Role::Admin, Role::Teacher, Role::Volunteer, Role::Student];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Volunteer => "volunteer",
            Role::Student => "student",
        }
    }

    /// Picks the highest-precedence role named in `groups`.
    ///
    /// Group names are compared exactly as the identity provider issues them.
    /// Identities without a matching group fall back to [`Role::Student`].
    pub fn from_groups<S: AsRef<str>>(groups: &[S]) -> Role {
        ROLE_HIERARCHY
            .into_iter()
            .find(|role| groups.iter().any(|group| group.as_ref() == role.as_str()))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AuthzError;

    fn from_str(value: &str) -> AuthzResult<Self> {
        match value {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "volunteer" => Ok(Role::Volunteer),
            "student" => Ok(Role::Student),
            other => Err(AuthzError::InvalidRole(other.to_string())),
        }
    }
}
