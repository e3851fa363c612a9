use crate::{Decision, DenyReason};
use serde::{Deserialize, Serialize};

/// Scoping flags that narrow an allowed permission.
///
/// Only flags that are set appear in the serialized form, so a record for an
/// unconditional grant carries `{}`. Unknown keys in stored records are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "is_false")]
    pub public: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub own_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub assigned_only: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Conditions {
    pub const NONE: Conditions = Conditions {
        public: false,
        own_only: false,
        assigned_only: false,
    };
    pub const PUBLIC: Conditions = Conditions {
        public: true,
        own_only: false,
        assigned_only: false,
    };
    pub const OWN_ONLY: Conditions = Conditions {
        public: false,
        own_only: true,
        assigned_only: false,
    };
    pub const ASSIGNED_ONLY: Conditions = Conditions {
        public: false,
        own_only: false,
        assigned_only: true,
    };

    pub fn is_empty(&self) -> bool {
        *self == Conditions::NONE
    }

    /// Applies the flags to an already-allowed permission.
    ///
    /// Precedence is `public`, then `own_only`, then `assigned_only`.
    /// `assigned_only` only requires a resource id to be present: callers are
    /// expected to have scoped the lookup to the assignee already. An empty
    /// resource id counts as absent.
    pub fn evaluate(&self, user_id: &str, resource_id: Option<&str>) -> Decision {
        let resource_id = resource_id.filter(|id| !id.is_empty());
        if self.public {
            return Decision::Allow;
        }
        if self.own_only {
            return match resource_id {
                None => Decision::Deny(DenyReason::MissingResourceId),
                Some(id) if id == user_id => Decision::Allow,
                Some(_) => Decision::Deny(DenyReason::NotOwner),
            };
        }
        if self.assigned_only && resource_id.is_none() {
            return Decision::Deny(DenyReason::MissingResourceId);
        }
        Decision::Allow
    }
}
