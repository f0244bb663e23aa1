use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::ScheduleStatus;
use sqlx::FromRow;

/// Schedule entity. The newest (highest id) schedule for a month is the
/// current one; earlier rows for the same month are superseded history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: i64,
    pub target_month: String,
    pub status: ScheduleStatus,
    pub generated_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
}
