use chrono::NaiveDate;
use shared::{DomainError, DomainResult, OffPeriod};
use std::collections::{HashMap, HashSet};

use crate::domain::entities::{
    DailyRequirement, DayOffRequest, Employee, JobCategory, WorkTarget,
};
use crate::domain::calendar::ScheduleMonth;

/// Everything one optimizer run consumes, loaded by the store adapter.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    pub month: ScheduleMonth,
    /// Ordered by `sort_order`; drives projection order.
    pub employees: Vec<Employee>,
    pub categories: Vec<JobCategory>,
    /// Employee id -> qualified category ids.
    pub qualifications: HashMap<i64, Vec<i64>>,
    pub day_off_requests: Vec<DayOffRequest>,
    pub work_targets: HashMap<i64, WorkTarget>,
    pub requirements: Vec<DailyRequirement>,
    /// Every date of the target month, ascending.
    pub all_dates: Vec<NaiveDate>,
    /// The staffed subset of `all_dates`.
    pub working_dates: Vec<NaiveDate>,
}

impl ProblemInstance {
    pub fn validate(&self) -> DomainResult<()> {
        if self.employees.is_empty() {
            return Err(DomainError::NoEmployees);
        }
        if self.category_ids_in_use().is_empty() {
            return Err(DomainError::NoQualifications);
        }
        Ok(())
    }

    /// Category ids some employee is qualified for, ascending. Variables are
    /// only created for these.
    pub fn category_ids_in_use(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .qualifications
            .values()
            .flatten()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_working_date(&self, date: NaiveDate) -> bool {
        self.working_dates.contains(&date)
    }

    pub fn is_qualified(&self, employee_id: i64, category_id: i64) -> bool {
        self.qualifications
            .get(&employee_id)
            .map(|ids| ids.contains(&category_id))
            .unwrap_or(false)
    }

    pub fn qualified_categories(&self, employee_id: i64) -> &[i64] {
        self.qualifications
            .get(&employee_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn employee_id_by_name(&self, name: &str) -> Option<i64> {
        self.employees.iter().find(|e| e.name == name).map(|e| e.id)
    }

    pub fn category_id_by_name(&self, name: &str) -> Option<i64> {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
    }

    /// Requirements on working dates, grouped per date in input order.
    pub fn requirements_by_date(&self) -> HashMap<NaiveDate, Vec<(i64, f64)>> {
        let mut by_date: HashMap<NaiveDate, Vec<(i64, f64)>> = HashMap::new();
        for req in &self.requirements {
            by_date
                .entry(req.date)
                .or_default()
                .push((req.job_category_id, req.required_count));
        }
        by_date
    }
}

/// Day-off requests folded into per-date availability. A date with both am
/// and pm requested is a full day off; a date with exactly one period is a
/// half-day, worked at headcount 0.5.
#[derive(Debug, Clone, Default)]
pub struct OffCalendar {
    full_off: HashMap<i64, HashSet<NaiveDate>>,
    half_off: HashMap<i64, HashMap<NaiveDate, OffPeriod>>,
}

impl OffCalendar {
    pub fn from_requests(requests: &[DayOffRequest]) -> Self {
        let mut periods: HashMap<(i64, NaiveDate), (bool, bool)> = HashMap::new();
        for req in requests {
            let entry = periods.entry((req.employee_id, req.date)).or_default();
            match req.period {
                OffPeriod::Am => entry.0 = true,
                OffPeriod::Pm => entry.1 = true,
                OffPeriod::AllDay => *entry = (true, true),
            }
        }

        let mut calendar = OffCalendar::default();
        for ((employee_id, date), (am, pm)) in periods {
            match (am, pm) {
                (true, true) => {
                    calendar
                        .full_off
                        .entry(employee_id)
                        .or_default()
                        .insert(date);
                }
                (true, false) => {
                    calendar
                        .half_off
                        .entry(employee_id)
                        .or_default()
                        .insert(date, OffPeriod::Am);
                }
                (false, true) => {
                    calendar
                        .half_off
                        .entry(employee_id)
                        .or_default()
                        .insert(date, OffPeriod::Pm);
                }
                (false, false) => {}
            }
        }
        calendar
    }

    pub fn is_full_off(&self, employee_id: i64, date: NaiveDate) -> bool {
        self.full_off
            .get(&employee_id)
            .map(|dates| dates.contains(&date))
            .unwrap_or(false)
    }

    /// The requested-off half for a strict half-day, if any.
    pub fn half_off_period(&self, employee_id: i64, date: NaiveDate) -> Option<OffPeriod> {
        self.half_off
            .get(&employee_id)
            .and_then(|dates| dates.get(&date))
            .copied()
    }

    /// Headcount factor on the doubled scale: 2 for a full-availability day,
    /// 1 for a half-day.
    pub fn hc_factor(&self, employee_id: i64, date: NaiveDate) -> i32 {
        if self.half_off_period(employee_id, date).is_some() {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn req(employee_id: i64, day: u32, period: OffPeriod) -> DayOffRequest {
        DayOffRequest {
            employee_id,
            date: d(day),
            period,
        }
    }

    #[test]
    fn test_all_day_request_is_full_off() {
        let calendar = OffCalendar::from_requests(&[req(1, 2, OffPeriod::AllDay)]);
        assert!(calendar.is_full_off(1, d(2)));
        assert_eq!(calendar.half_off_period(1, d(2)), None);
        assert_eq!(calendar.hc_factor(1, d(2)), 2);
    }

    #[test]
    fn test_am_plus_pm_rows_union_to_full_off() {
        let calendar =
            OffCalendar::from_requests(&[req(1, 3, OffPeriod::Am), req(1, 3, OffPeriod::Pm)]);
        assert!(calendar.is_full_off(1, d(3)));
        assert_eq!(calendar.half_off_period(1, d(3)), None);
    }

    #[test]
    fn test_single_period_is_half_day() {
        let calendar = OffCalendar::from_requests(&[req(1, 4, OffPeriod::Am)]);
        assert!(!calendar.is_full_off(1, d(4)));
        assert_eq!(calendar.half_off_period(1, d(4)), Some(OffPeriod::Am));
        assert_eq!(calendar.hc_factor(1, d(4)), 1);
    }

    #[test]
    fn test_duplicate_rows_are_idempotent() {
        let calendar =
            OffCalendar::from_requests(&[req(1, 5, OffPeriod::Pm), req(1, 5, OffPeriod::Pm)]);
        assert_eq!(calendar.half_off_period(1, d(5)), Some(OffPeriod::Pm));
        assert_eq!(calendar.hc_factor(1, d(5)), 1);
    }

    #[test]
    fn test_unrequested_day_is_available() {
        let calendar = OffCalendar::from_requests(&[]);
        assert!(!calendar.is_full_off(7, d(2)));
        assert_eq!(calendar.hc_factor(7, d(2)), 2);
    }
}
