use serde::Serialize;
use shared::WorkType;
use std::collections::HashMap;

use crate::domain::entities::{Assignment, Employee, JobCategory, WorkTarget};

/// Monthly totals for one employee.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeReport {
    pub employee_id: i64,
    pub employee_name: String,
    /// Sum of headcount over worked days; half-days count 0.5.
    pub total_work_days: f64,
    /// Days off that fall on working dates (weekends and holidays excluded).
    pub total_days_off: u32,
    pub requested_work_days: Option<String>,
    pub job_category_counts: Vec<(String, f64)>,
}

/// Roster-wide view of the newest schedule of a month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub month: String,
    pub employees: Vec<EmployeeReport>,
    pub fairness_max: f64,
    pub fairness_min: f64,
    pub fairness_diff: f64,
}

/// Aggregate a schedule's assignments into per-employee totals and the
/// fairness spread.
pub fn build_report(
    month: &str,
    employees: &[Employee],
    categories: &[JobCategory],
    assignments: &[Assignment],
    work_targets: &HashMap<i64, WorkTarget>,
    working_dates: &[chrono::NaiveDate],
) -> MonthlyReport {
    let category_names: HashMap<i64, &str> =
        categories.iter().map(|c| (c.id, c.name.as_str())).collect();

    let mut reports = Vec::with_capacity(employees.len());
    let mut work_days: Vec<f64> = Vec::with_capacity(employees.len());

    for employee in employees {
        let rows: Vec<&Assignment> = assignments
            .iter()
            .filter(|a| a.employee_id == employee.id)
            .collect();

        let total_work: f64 = rows
            .iter()
            .filter(|a| a.work_type.is_working())
            .map(|a| a.headcount_value)
            .sum();
        let total_off = rows
            .iter()
            .filter(|a| a.work_type == WorkType::Off && working_dates.contains(&a.date))
            .count() as u32;

        let mut counts: Vec<(String, f64)> = Vec::new();
        for row in rows.iter().filter(|a| a.work_type.is_working()) {
            let name = row
                .job_category_id
                .and_then(|id| category_names.get(&id).copied())
                .unwrap_or("不明")
                .to_string();
            match counts.iter_mut().find(|(n, _)| *n == name) {
                Some((_, count)) => *count += row.headcount_value,
                None => counts.push((name, row.headcount_value)),
            }
        }

        let requested = work_targets.get(&employee.id).map(|target| match target {
            WorkTarget::Max => "max".to_string(),
            WorkTarget::Days(days) => days.to_string(),
        });

        work_days.push(total_work);
        reports.push(EmployeeReport {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            total_work_days: total_work,
            total_days_off: total_off,
            requested_work_days: requested,
            job_category_counts: counts,
        });
    }

    let fairness_max = work_days.iter().copied().fold(0.0, f64::max);
    let fairness_min = if work_days.is_empty() {
        0.0
    } else {
        work_days.iter().copied().fold(f64::INFINITY, f64::min)
    };

    MonthlyReport {
        month: month.to_string(),
        employees: reports,
        fairness_max,
        fairness_min,
        fairness_diff: fairness_max - fairness_min,
    }
}
