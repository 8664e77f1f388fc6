#![forbid(unsafe_code)]

#[derive(Clone, Debug)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub last_login_ms: Option<i64>,
    pub created_ms: i64,
    pub updated_ms: i64,
}

/// Contact summary embedded in project and task payloads.
#[derive(Clone, Debug)]
pub struct UserLite {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Clone, Debug)]
pub struct SessionRow {
    pub token: String,
    pub user_id: String,
    pub created_ms: i64,
    pub expires_ms: i64,
}

#[derive(Clone, Debug)]
pub struct ConsultantRow {
    pub id: String,
    pub user_id: String,
    pub tjm: f64,
    pub specialization: String,
    pub skills: Vec<String>,
    pub experience_years: i64,
    pub biography: Option<String>,
    pub is_available: bool,
    pub reliability: f64,
    pub created_ms: i64,
    pub updated_ms: i64,
}

#[derive(Clone, Debug)]
pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub budget: f64,
    pub budget_used: f64,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub deadline_ms: Option<i64>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub creator_id: String,
    pub manager_id: Option<String>,
    pub is_active: bool,
    pub created_ms: i64,
    pub updated_ms: i64,
}

#[derive(Clone, Debug)]
pub struct TaskRow {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub budget: f64,
    pub estimated_hours: f64,
    pub actual_hours: Option<f64>,
    pub assigned_user_id: Option<String>,
    pub parent_task_id: Option<String>,
    pub position: i64,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub deadline_ms: Option<i64>,
    pub created_ms: i64,
    pub updated_ms: i64,
}

#[derive(Clone, Debug)]
pub struct TransactionRow {
    pub id: String,
    pub tx_type: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub reference: Option<String>,
    pub project_id: Option<String>,
    pub consultant_id: Option<String>,
    pub is_paid: bool,
    pub due_ms: Option<i64>,
    pub created_ms: i64,
}

#[derive(Clone, Debug)]
pub struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub notif_type: String,
    pub title: String,
    pub message: String,
    pub entity_id: Option<String>,
    pub entity_type: Option<String>,
    pub is_read: bool,
    pub read_ms: Option<i64>,
    pub created_ms: i64,
}

/// Everything a status change touched. The caller decides who gets
/// notified from the project parties carried here.
#[derive(Clone, Debug)]
pub struct TaskStatusChange {
    pub task: TaskRow,
    pub previous_status: String,
    pub payment: Option<TransactionRow>,
    pub project_creator_id: String,
    pub project_manager_id: Option<String>,
}

/// Aggregates attached to each entry of the consultant listing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsultantSnapshot {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub completion_rate: i64,
    pub reliability: i64,
    pub total_earnings: f64,
}

/// Full per-consultant activity figures backing the stats and compare
/// endpoints. Ratios follow the product rules: only completed tasks with
/// both hour fields count, the stats view caps each ratio at 2.
#[derive(Clone, Debug, Default)]
pub struct ConsultantActivity {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub pending_tasks: i64,
    pub unique_projects: i64,
    pub avg_ratio_capped: f64,
    pub avg_ratio_raw: f64,
    pub timed_tasks: i64,
    pub timed_hours: f64,
    pub total_hours_worked: f64,
    pub total_earnings: f64,
    pub paid_earnings: f64,
    pub salary_transactions: i64,
    pub avg_task_duration_days: i64,
    pub recent_project_titles: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct MonthActivity {
    pub month: String,
    pub tasks_completed: i64,
    pub hours_worked: f64,
    pub earnings: f64,
}

/// Totals over a filtered ledger slice. The per-type figures ignore the
/// filter's own type restriction so both sides stay visible.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionSummary {
    pub total_transactions: i64,
    pub total_amount: f64,
    pub total_entrees: f64,
    pub entrees_count: i64,
    pub total_sorties: f64,
    pub sorties_count: i64,
}

impl TransactionSummary {
    pub fn balance(&self) -> f64 {
        self.total_entrees - self.total_sorties
    }
}

#[derive(Clone, Debug)]
pub struct CategoryBreakdown {
    pub category: String,
    pub tx_type: String,
    pub amount: f64,
    pub count: i64,
}

/// Ledger total per project or consultant. `label` is `None` when the
/// referenced row no longer exists.
#[derive(Clone, Debug)]
pub struct CounterpartyTotal {
    pub id: String,
    pub label: Option<String>,
    pub amount: f64,
    pub count: i64,
}

#[derive(Clone, Debug)]
pub struct PeriodBucket {
    pub period: String,
    pub entrees: f64,
    pub sorties: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DashboardCounters {
    pub projects: i64,
    pub tasks: i64,
    pub consultants: i64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TaskStatusCounts {
    pub a_faire: i64,
    pub en_cours: i64,
    pub termine: i64,
}

#[derive(Clone, Debug)]
pub struct MonthFinance {
    pub month: String,
    pub revenus: f64,
    pub depenses: f64,
    pub projets: i64,
}

/// Row counts written by the demo seeder.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub consultants: usize,
    pub projects: usize,
    pub tasks: usize,
    pub transactions: usize,
}
