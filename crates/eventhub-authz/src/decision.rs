/// Outcome of a permission evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No record or matrix entry exists for the role.
    NoRule,
    /// A record exists but its `allowed` flag is false.
    Disallowed,
    /// A scoping condition needs a resource id and none was supplied.
    MissingResourceId,
    /// `own_only` resource id does not belong to the caller.
    NotOwner,
    /// The permission store could not answer.
    LookupFailed,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenyReason::NoRule => "no_rule",
            DenyReason::Disallowed => "disallowed",
            DenyReason::MissingResourceId => "missing_resource_id",
            DenyReason::NotOwner => "not_owner",
            DenyReason::LookupFailed => "lookup_failed",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
