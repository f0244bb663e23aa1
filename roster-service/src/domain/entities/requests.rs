use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::OffPeriod;
use sqlx::FromRow;
use std::str::FromStr;

/// One requested off period for an employee. Multiple rows for the same
/// (employee, date) are unioned: am + pm is equivalent to all_day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DayOffRequest {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub period: OffPeriod,
}

/// Per-employee monthly work-days target, persisted as "1".."23" or "max".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkTarget {
    Days(u32),
    Max,
}

impl FromStr for WorkTarget {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "max" {
            return Ok(WorkTarget::Max);
        }
        match s.parse::<u32>() {
            Ok(n) if (1..=23).contains(&n) => Ok(WorkTarget::Days(n)),
            _ => Err(()),
        }
    }
}

/// Required headcount for a (date, category) pair. Half steps are allowed;
/// the model doubles everything to stay in integer arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyRequirement {
    pub date: NaiveDate,
    pub job_category_id: i64,
    pub required_count: f64,
}
