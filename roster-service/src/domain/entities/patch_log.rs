use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::PatchStatus;
use sqlx::FromRow;

/// Audit row for one natural-language modification of a schedule. The
/// `parsed_instruction` column carries the oracle's edit list as JSON and,
/// once the rebuild finishes, the id of the schedule it produced.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PatchLog {
    pub id: i64,
    pub schedule_id: i64,
    pub input_text: String,
    pub parsed_instruction: Option<String>,
    pub status: PatchStatus,
    pub created_at: DateTime<Utc>,
}
