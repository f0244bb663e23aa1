use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "employment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    Dependent,
}

/// How an employee spends a scheduled day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "work_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Full,
    MorningHalf,
    AfternoonHalf,
    Off,
}

impl WorkType {
    /// Headcount contributed by an assignment of this work type.
    pub fn headcount_value(self) -> f64 {
        match self {
            WorkType::Full => 1.0,
            WorkType::MorningHalf | WorkType::AfternoonHalf => 0.5,
            WorkType::Off => 0.0,
        }
    }

    pub fn is_working(self) -> bool {
        self != WorkType::Off
    }
}

/// Requested off period within a day. `all_day` is equivalent to both
/// `am` and `pm` being requested.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "off_period", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OffPeriod {
    Am,
    Pm,
    AllDay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "schedule_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Draft,
    Preview,
    Confirmed,
    Published,
}

impl std::str::FromStr for ScheduleStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ScheduleStatus::Draft),
            "preview" => Ok(ScheduleStatus::Preview),
            "confirmed" => Ok(ScheduleStatus::Confirmed),
            "published" => Ok(ScheduleStatus::Published),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "patch_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PatchStatus {
    Pending,
    Approved,
    Rejected,
}
