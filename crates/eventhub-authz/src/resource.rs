use crate::Action;
use serde::{Deserialize, Serialize};

/// Record types the platform authorizes access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Events,
    Competitions,
    Courses,
    Registrations,
    Suggestions,
    Messages,
    Volunteers,
    VolunteerTasks,
    VolunteerApplications,
    AdminStats,
    Payments,
}

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Events,
        Resource::Competitions,
        Resource::Courses,
        Resource::Registrations,
        Resource::Suggestions,
        Resource::Messages,
        Resource::Volunteers,
        Resource::VolunteerTasks,
        Resource::VolunteerApplications,
        Resource::AdminStats,
        Resource::Payments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Events => "events",
            Resource::Competitions => "competitions",
            Resource::Courses => "courses",
            Resource::Registrations => "registrations",
            Resource::Suggestions => "suggestions",
            Resource::Messages => "messages",
            Resource::Volunteers => "volunteers",
            Resource::VolunteerTasks => "volunteer_tasks",
            Resource::VolunteerApplications => "volunteer_applications",
            Resource::AdminStats => "admin_stats",
            Resource::Payments => "payments",
        }
    }

    /// Actions that exist for this resource, regardless of role.
    pub fn supported_actions(self) -> &'static [Action] {
        match self {
            Resource::AdminStats => &[Action::Read],
            Resource::Payments => &[Action::Create, Action::Webhook],
            _ => &Action::CRUD,
        }
    }

    pub fn supports(self, action: Action) -> bool {
        self.supported_actions().contains(&action)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
