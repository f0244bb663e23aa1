use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Job category entity. Lower id means higher priority; ids 1 and 2 are the
/// categories staffed by exactly one full-day employee per working date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobCategory {
    pub id: i64,
    pub name: String,
}

/// Whether a category is staffed by exactly one person per working day.
pub fn one_per_day(category_id: i64) -> bool {
    category_id <= 2
}
