#![forbid(unsafe_code)]

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: String,
}

#[derive(Clone, Debug)]
pub struct NewConsultantProfile {
    pub tjm: f64,
    pub specialization: String,
    pub skills: Vec<String>,
    pub experience_years: i64,
    pub biography: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ConsultantUpdate {
    pub tjm: Option<f64>,
    pub specialization: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience_years: Option<i64>,
    pub biography: Option<String>,
    pub is_available: Option<bool>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ConsultantFilter {
    pub search: Option<String>,
    pub skill: Option<String>,
    pub available: Option<bool>,
    pub sort_by: ConsultantSort,
    pub sort_desc: bool,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsultantSort {
    Reliability,
    Experience,
    Tjm,
    Name,
}

#[derive(Clone, Debug)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub estimated_hours: f64,
    pub priority: String,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub deadline_ms: Option<i64>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub creator_id: String,
    pub manager_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub deadline_ms: Option<i64>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub manager_id: Option<String>,
}

/// `viewer` scopes the listing to projects the user created, manages or
/// works on; `None` lists everything (director view).
#[derive(Clone, Debug)]
pub struct ProjectFilter {
    pub viewer: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Clone, Debug)]
pub struct NewTask {
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub estimated_hours: f64,
    pub priority: String,
    pub deadline_ms: Option<i64>,
    pub assigned_user_id: Option<String>,
    pub parent_task_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TaskFilter {
    pub viewer: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub project_id: Option<String>,
    pub assigned_user_id: Option<String>,
    pub sort_by: TaskSort,
    pub sort_desc: bool,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskSort {
    CreatedAt,
    Deadline,
    Priority,
    Title,
}

#[derive(Clone, Debug)]
pub struct TaskAssignment {
    pub assigned_user_id: String,
    pub estimated_hours: Option<f64>,
    pub budget: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub tx_type: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub reference: Option<String>,
    pub project_id: Option<String>,
    pub consultant_id: Option<String>,
    pub is_paid: bool,
    pub due_ms: Option<i64>,
}

/// Bucket width of the finance timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeriodGroup {
    Day,
    Week,
    Month,
}

impl PeriodGroup {
    /// strftime pattern producing the bucket label for this width.
    pub(crate) fn strftime_pattern(self) -> &'static str {
        match self {
            PeriodGroup::Day => "%Y-%m-%d",
            PeriodGroup::Week => "%Y-W%W",
            PeriodGroup::Month => "%Y-%m",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub tx_type: Option<String>,
    pub category: Option<String>,
    pub project_id: Option<String>,
    pub consultant_id: Option<String>,
    pub min_ms: Option<i64>,
    pub max_ms: Option<i64>,
    pub is_paid: Option<bool>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Clone, Debug)]
pub struct NewNotification {
    pub user_id: String,
    pub notif_type: String,
    pub title: String,
    pub message: String,
    pub entity_id: Option<String>,
    pub entity_type: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NotificationFilter {
    pub user_id: String,
    pub unread_only: bool,
    pub limit: usize,
    pub offset: usize,
}
