use super::problem::{OffCalendar, ProblemInstance};
use super::solver::AssignedMap;

/// Compare the solved assignments against every requirement row on a working
/// date and report the shortages. Half-day workers supply 0.5 headcount.
/// Shortages are never fatal; the schedule is persisted regardless.
pub fn collect_violations(
    instance: &ProblemInstance,
    off: &OffCalendar,
    assigned: &AssignedMap,
) -> Vec<String> {
    let requirements = instance.requirements_by_date();
    let mut violations = Vec::new();
    for &date in &instance.working_dates {
        let Some(rows) = requirements.get(&date) else {
            continue;
        };
        for &(category_id, required) in rows {
            let supplied: f64 = instance
                .employees
                .iter()
                .filter(|e| assigned.get(&(e.id, date)) == Some(&category_id))
                .map(|e| f64::from(off.hc_factor(e.id, date)) / 2.0)
                .sum();
            if supplied < required {
                violations.push(format!(
                    "{} - job_type {}: needed {}, got {}",
                    date, category_id, required, supplied
                ));
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::ScheduleMonth;
    use crate::domain::entities::{DailyRequirement, Employee, JobCategory};
    use chrono::NaiveDate;
    use shared::{EmploymentType, OffPeriod};
    use std::collections::HashMap;

    fn employee(id: i64, name: &str) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            employment_type: EmploymentType::FullTime,
            sort_order: id as i32,
        }
    }

    fn instance_with_requirement(required: f64) -> (ProblemInstance, NaiveDate) {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let month = ScheduleMonth::parse("2026-03").unwrap();
        let instance = ProblemInstance {
            month,
            employees: vec![employee(1, "和平映美")],
            categories: vec![JobCategory {
                id: 3,
                name: "データ".to_string(),
            }],
            qualifications: HashMap::from([(1, vec![3])]),
            day_off_requests: Vec::new(),
            work_targets: HashMap::new(),
            requirements: vec![DailyRequirement {
                date,
                job_category_id: 3,
                required_count: required,
            }],
            all_dates: month.dates(),
            working_dates: vec![date],
        };
        (instance, date)
    }

    #[test]
    fn test_shortage_is_reported() {
        let (instance, date) = instance_with_requirement(2.0);
        let off = OffCalendar::from_requests(&[]);
        let assigned = AssignedMap::from([((1, date), 3)]);

        let violations = collect_violations(&instance, &off, &assigned);
        assert_eq!(
            violations,
            vec!["2026-03-02 - job_type 3: needed 2, got 1".to_string()]
        );
    }

    #[test]
    fn test_half_day_supply_counts_half() {
        let (mut instance, date) = instance_with_requirement(0.5);
        instance.day_off_requests = vec![crate::domain::entities::DayOffRequest {
            employee_id: 1,
            date,
            period: OffPeriod::Am,
        }];
        let off = OffCalendar::from_requests(&instance.day_off_requests);
        let assigned = AssignedMap::from([((1, date), 3)]);

        let violations = collect_violations(&instance, &off, &assigned);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_met_requirement_is_silent() {
        let (instance, date) = instance_with_requirement(1.0);
        let off = OffCalendar::from_requests(&[]);
        let assigned = AssignedMap::from([((1, date), 3)]);

        assert!(collect_violations(&instance, &off, &assigned).is_empty());
    }

    #[test]
    fn test_unassigned_pair_supplies_zero() {
        let (instance, _date) = instance_with_requirement(1.0);
        let off = OffCalendar::from_requests(&[]);
        let assigned = AssignedMap::new();

        let violations = collect_violations(&instance, &off, &assigned);
        assert_eq!(
            violations,
            vec!["2026-03-02 - job_type 3: needed 1, got 0".to_string()]
        );
    }
}
