use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardQuery {
    /// Admin-only: widen or narrow the scope to a specific recruiter.
    pub owner: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunnelQuery {
    pub job_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WidgetQuery {
    pub limit: Option<i64>,
}
