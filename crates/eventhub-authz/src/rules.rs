//! The declarative role rule table.
//!
//! Both the seeded permission records and the in-process fallback matrix are
//! generated from this table, so the two cannot drift apart. Anything a role
//! is not granted here is denied.
use crate::{Action, Conditions, Resource, Role};

/// A set of actions on one resource granted under the same conditions.
#[derive(Debug, Clone, Copy)]
pub struct Grant {
    pub resource: Resource,
    pub actions: &'static [Action],
    pub conditions: Conditions,
}

impl Grant {
    const fn new(resource: Resource, actions: &'static [Action], conditions: Conditions) -> Self {
        Self {
            resource,
            actions,
            conditions,
        }
    }
}

/// One allowed `(role, resource, action)` entry with its conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub role: Role,
    pub resource: Resource,
    pub action: Action,
    pub conditions: Conditions,
}

const READ: &[Action] = &[Action::Read];
const CREATE: &[Action] = &[Action::Create];
const READ_UPDATE: &[Action] = &[Action::Read, Action::Update];
const UPDATE: &[Action] = &[Action::Update];
const WRITE: &[Action] = &[Action::Create, Action::Update, Action::Delete];

const TEACHER_GRANTS: &[Grant] = &[
    Grant::new(Resource::Events, READ, Conditions::PUBLIC),
    Grant::new(Resource::Events, CREATE, Conditions::NONE),
    Grant::new(Resource::Competitions, READ, Conditions::PUBLIC),
    Grant::new(Resource::Competitions, CREATE, Conditions::NONE),
    Grant::new(Resource::Courses, READ, Conditions::PUBLIC),
    Grant::new(Resource::Courses, WRITE, Conditions::OWN_ONLY),
    Grant::new(Resource::Registrations, READ, Conditions::NONE),
    Grant::new(Resource::Suggestions, READ, Conditions::PUBLIC),
    Grant::new(Resource::Suggestions, CREATE, Conditions::NONE),
    Grant::new(Resource::Messages, READ, Conditions::PUBLIC),
    Grant::new(Resource::Messages, CREATE, Conditions::NONE),
];

const VOLUNTEER_GRANTS: &[Grant] = &[
    Grant::new(Resource::Events, READ, Conditions::PUBLIC),
    Grant::new(Resource::Events, CREATE, Conditions::NONE),
    Grant::new(Resource::Competitions, READ, Conditions::PUBLIC),
    Grant::new(Resource::Competitions, CREATE, Conditions::NONE),
    Grant::new(Resource::Courses, READ, Conditions::PUBLIC),
    Grant::new(Resource::Courses, CREATE, Conditions::NONE),
    Grant::new(Resource::Registrations, READ, Conditions::OWN_ONLY),
    Grant::new(Resource::Registrations, CREATE, Conditions::NONE),
    Grant::new(Resource::Suggestions, READ, Conditions::PUBLIC),
    Grant::new(Resource::Suggestions, CREATE, Conditions::NONE),
    Grant::new(Resource::Messages, READ, Conditions::PUBLIC),
    Grant::new(Resource::Messages, CREATE, Conditions::NONE),
    Grant::new(Resource::Volunteers, READ_UPDATE, Conditions::OWN_ONLY),
    Grant::new(Resource::VolunteerTasks, READ, Conditions::ASSIGNED_ONLY),
    // Task updates are keyed by the assignee's user id.
    Grant::new(Resource::VolunteerTasks, UPDATE, Conditions::OWN_ONLY),
    Grant::new(Resource::VolunteerApplications, READ, Conditions::OWN_ONLY),
    Grant::new(Resource::VolunteerApplications, CREATE, Conditions::NONE),
    Grant::new(Resource::Payments, CREATE, Conditions::NONE),
];

const STUDENT_GRANTS: &[Grant] = &[
    Grant::new(Resource::Events, READ, Conditions::PUBLIC),
    Grant::new(Resource::Events, CREATE, Conditions::NONE),
    Grant::new(Resource::Competitions, READ, Conditions::PUBLIC),
    Grant::new(Resource::Competitions, CREATE, Conditions::NONE),
    Grant::new(Resource::Courses, READ, Conditions::PUBLIC),
    Grant::new(Resource::Courses, CREATE, Conditions::NONE),
    Grant::new(Resource::Registrations, READ, Conditions::OWN_ONLY),
    Grant::new(Resource::Registrations, CREATE, Conditions::NONE),
    Grant::new(Resource::Suggestions, READ, Conditions::PUBLIC),
    Grant::new(Resource::Suggestions, CREATE, Conditions::NONE),
    Grant::new(Resource::Messages, READ, Conditions::PUBLIC),
    Grant::new(Resource::Messages, CREATE, Conditions::NONE),
    Grant::new(Resource::VolunteerApplications, CREATE, Conditions::NONE),
    Grant::new(Resource::Payments, CREATE, Conditions::NONE),
];

/// Explicit grants for a non-admin role. Admin is granted every pair.
pub fn grants(role: Role) -> &'static [Grant] {
    match role {
        Role::Admin => &[],
        Role::Teacher => TEACHER_GRANTS,
        Role::Volunteer => VOLUNTEER_GRANTS,
        Role::Student => STUDENT_GRANTS,
    }
}

/// Conditions for `(role, resource, action)`, or `None` when not granted.
pub fn lookup(role: Role, resource: Resource, action: Action) -> Option<Conditions> {
    if !resource.supports(action) {
        return None;
    }
    if role == Role::Admin {
        return Some(Conditions::NONE);
    }
    grants(role)
        .iter()
        .find(|grant| grant.resource == resource && grant.actions.contains(&action))
        .map(|grant| grant.conditions)
}

/// Every allowed entry of the table, ordered by role then resource then action.
pub fn rules() -> Vec<Rule> {
    let mut rules = Vec::new();
    for role in [Role::Student, Role::Teacher, Role::Volunteer, Role::Admin] {
        for resource in Resource::ALL {
            for &action in resource.supported_actions() {
                if let Some(conditions) = lookup(role, resource, action) {
                    rules.push(Rule {
                        role,
                        resource,
                        action,
                        conditions,
                    });
                }
            }
        }
    }
    rules
}
