use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::WorkType;
use sqlx::FromRow;

/// Persisted assignment row. Exactly one exists per (schedule, employee, date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub schedule_id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub job_category_id: Option<i64>,
    pub work_type: WorkType,
    pub headcount_value: f64,
}

/// One projected cell of a schedule, before it is persisted. The store
/// assigns row and schedule ids when the schedule is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAssignment {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub job_category_id: Option<i64>,
    pub work_type: WorkType,
    pub headcount_value: f64,
}

impl DayAssignment {
    pub fn off(employee_id: i64, date: NaiveDate) -> Self {
        Self {
            employee_id,
            date,
            job_category_id: None,
            work_type: WorkType::Off,
            headcount_value: 0.0,
        }
    }

    pub fn working(employee_id: i64, date: NaiveDate, category_id: i64, work_type: WorkType) -> Self {
        Self {
            employee_id,
            date,
            job_category_id: Some(category_id),
            work_type,
            headcount_value: work_type.headcount_value(),
        }
    }
}
