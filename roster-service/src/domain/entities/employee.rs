use serde::{Deserialize, Serialize};
use shared::EmploymentType;
use sqlx::FromRow;

/// Employee entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub employment_type: EmploymentType,
    pub sort_order: i32,
}
