use crate::{Conditions, Role, rules};

/// A pattern is either `*` or an exact name.
fn pattern_matches(pattern: &str, value: &str) -> bool {
    pattern == "*" || pattern == value
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixEntry {
    pub role: Role,
    pub resource_pattern: String,
    pub action_pattern: String,
    pub conditions: Conditions,
}

impl MatrixEntry {
    pub fn new(
        role: Role,
        resource_pattern: impl Into<String>,
        action_pattern: impl Into<String>,
        conditions: Conditions,
    ) -> Self {
        Self {
            role,
            resource_pattern: resource_pattern.into(),
            action_pattern: action_pattern.into(),
            conditions,
        }
    }

    fn matches(&self, role: Role, resource: &str, action: &str) -> bool {
        self.role == role
            && pattern_matches(&self.resource_pattern, resource)
            && pattern_matches(&self.action_pattern, action)
    }
}

/// In-process permission table used when no permission store is configured.
///
/// Entries are checked in order and the first match decides the conditions.
#[derive(Debug, Clone)]
pub struct FallbackMatrix {
    entries: Vec<MatrixEntry>,
}

impl FallbackMatrix {
    pub fn new(entries: Vec<MatrixEntry>) -> Self {
        Self { entries }
    }

    /// Builds the matrix from the shared rule table. Admin holds a single
    /// `*`/`*` entry instead of one entry per pair.
    pub fn from_rules() -> Self {
        let mut entries = vec![MatrixEntry::new(Role::Admin, "*", "*", Conditions::NONE)];
        entries.extend(
            rules::rules()
                .into_iter()
                .filter(|rule| rule.role != Role::Admin)
                .map(|rule| {
                    MatrixEntry::new(
                        rule.role,
                        rule.resource.as_str(),
                        rule.action.as_str(),
                        rule.conditions,
                    )
                }),
        );
        Self::new(entries)
    }

    pub fn lookup(&self, role: Role, resource: &str, action: &str) -> Option<Conditions> {
        self.entries
            .iter()
            .find(|entry| entry.matches(role, resource, action))
            .map(|entry| entry.conditions)
    }

    pub fn entries(&self) -> &[MatrixEntry] {
        &self.entries
    }
}

impl Default for FallbackMatrix {
    fn default() -> Self {
        Self::from_rules()
    }
}
