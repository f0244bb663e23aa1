#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use mockall::mock;
use shared::{DomainError, DomainResult, EmploymentType, PatchStatus, ScheduleStatus, WorkType};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use roster_service::domain::calendar::ScheduleMonth;
use roster_service::domain::entities::{
    Assignment, DailyRequirement, DayAssignment, DayOffRequest, Employee, JobCategory, PatchLog,
    Schedule,
};
use roster_service::domain::nlp::{ModificationOracle, OracleRequest, ScheduleEdit};
use roster_service::domain::optimizer::problem::ProblemInstance;
use roster_service::domain::optimizer::ScheduleOptimizer;
use roster_service::domain::repositories::ScheduleStore;

pub const TEST_MONTH: &str = "2026-03";

pub fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

pub fn canonical_categories() -> Vec<JobCategory> {
    [(1, "職人"), (2, "サブ職人"), (3, "データ"), (4, "その他")]
        .into_iter()
        .map(|(id, name)| JobCategory {
            id,
            name: name.to_string(),
        })
        .collect()
}

pub fn employee(id: i64, name: &str) -> Employee {
    Employee {
        id,
        name: name.to_string(),
        employment_type: EmploymentType::FullTime,
        sort_order: id as i32,
    }
}

/// A March 2026 instance whose staffed dates are the given days of the
/// month. Employees, qualifications, requests, and requirements are filled
/// in by the caller.
pub fn base_instance(working_days: &[u32]) -> ProblemInstance {
    let month = ScheduleMonth::parse(TEST_MONTH).unwrap();
    ProblemInstance {
        month,
        employees: Vec::new(),
        categories: canonical_categories(),
        qualifications: HashMap::new(),
        day_off_requests: Vec::new(),
        work_targets: HashMap::new(),
        requirements: Vec::new(),
        all_dates: month.dates(),
        working_dates: working_days.iter().map(|&d| march(d)).collect(),
    }
}

pub fn requirement(day: u32, category_id: i64, count: f64) -> DailyRequirement {
    DailyRequirement {
        date: march(day),
        job_category_id: category_id,
        required_count: count,
    }
}

pub fn day_off(employee_id: i64, day: u32, period: shared::OffPeriod) -> DayOffRequest {
    DayOffRequest {
        employee_id,
        date: march(day),
        period,
    }
}

pub fn optimizer_for(store: &Arc<InMemoryScheduleStore>) -> ScheduleOptimizer {
    ScheduleOptimizer::new(store.clone(), Duration::from_secs(30))
}

// Generate mock for ModificationOracle using mockall (for the LLM call)
mock! {
    pub ModificationOracle {}

    #[async_trait]
    impl ModificationOracle for ModificationOracle {
        async fn parse_instruction(
            &self,
            request: OracleRequest,
        ) -> DomainResult<Vec<ScheduleEdit>>;
    }
}

/// An oracle that answers every instruction with the given edit list.
pub fn fixed_oracle(edits: Vec<ScheduleEdit>) -> Arc<MockModificationOracle> {
    let mut oracle = MockModificationOracle::new();
    oracle
        .expect_parse_instruction()
        .returning(move |_| Ok(edits.clone()));
    Arc::new(oracle)
}

#[derive(Default)]
struct StoreState {
    schedules: Vec<Schedule>,
    assignments: Vec<Assignment>,
    patch_logs: Vec<PatchLog>,
    next_schedule_id: i64,
    next_assignment_id: i64,
    next_log_id: i64,
}

/// Store double keeping everything behind one mutex, with the same id and
/// ownership semantics as the Postgres adapter (cascade on schedule delete,
/// monotonically increasing ids).
pub struct InMemoryScheduleStore {
    instance: ProblemInstance,
    state: Mutex<StoreState>,
}

impl InMemoryScheduleStore {
    pub fn new(instance: ProblemInstance) -> Arc<Self> {
        Arc::new(Self {
            instance,
            state: Mutex::new(StoreState {
                next_schedule_id: 1,
                next_assignment_id: 1,
                next_log_id: 1,
                ..StoreState::default()
            }),
        })
    }

    pub fn schedule_count(&self) -> usize {
        self.state.lock().unwrap().schedules.len()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn load_problem_instance(&self, _month: &str) -> DomainResult<ProblemInstance> {
        Ok(self.instance.clone())
    }

    async fn list_employees(&self) -> DomainResult<Vec<Employee>> {
        Ok(self.instance.employees.clone())
    }

    async fn list_categories(&self) -> DomainResult<Vec<JobCategory>> {
        Ok(self.instance.categories.clone())
    }

    async fn find_schedule(&self, schedule_id: i64) -> DomainResult<Option<Schedule>> {
        let state = self.state.lock().unwrap();
        Ok(state.schedules.iter().find(|s| s.id == schedule_id).cloned())
    }

    async fn latest_schedule_for_month(&self, month: &str) -> DomainResult<Option<Schedule>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .schedules
            .iter()
            .filter(|s| s.target_month == month)
            .max_by_key(|s| s.id)
            .cloned())
    }

    async fn assignments_for(&self, schedule_id: i64) -> DomainResult<Vec<Assignment>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Assignment> = state
            .assignments
            .iter()
            .filter(|a| a.schedule_id == schedule_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.employee_id, a.date));
        Ok(rows)
    }

    async fn persist_schedule(
        &self,
        month: &str,
        assignments: &[DayAssignment],
    ) -> DomainResult<i64> {
        let mut state = self.state.lock().unwrap();
        let schedule_id = state.next_schedule_id;
        state.next_schedule_id += 1;
        state.schedules.push(Schedule {
            id: schedule_id,
            target_month: month.to_string(),
            status: ScheduleStatus::Preview,
            generated_at: Some(Utc::now()),
            confirmed_at: None,
        });
        for assignment in assignments {
            let id = state.next_assignment_id;
            state.next_assignment_id += 1;
            state.assignments.push(Assignment {
                id,
                schedule_id,
                employee_id: assignment.employee_id,
                date: assignment.date,
                job_category_id: assignment.job_category_id,
                work_type: assignment.work_type,
                headcount_value: assignment.headcount_value,
            });
        }
        Ok(schedule_id)
    }

    async fn clone_schedule(&self, schedule_id: i64) -> DomainResult<i64> {
        let mut state = self.state.lock().unwrap();
        let original = state
            .schedules
            .iter()
            .find(|s| s.id == schedule_id)
            .cloned()
            .ok_or(DomainError::UnknownSchedule(schedule_id))?;

        let new_id = state.next_schedule_id;
        state.next_schedule_id += 1;
        state.schedules.push(Schedule {
            id: new_id,
            target_month: original.target_month,
            status: ScheduleStatus::Preview,
            generated_at: Some(Utc::now()),
            confirmed_at: None,
        });

        let copies: Vec<Assignment> = state
            .assignments
            .iter()
            .filter(|a| a.schedule_id == schedule_id)
            .cloned()
            .collect();
        for mut copy in copies {
            copy.id = state.next_assignment_id;
            state.next_assignment_id += 1;
            copy.schedule_id = new_id;
            state.assignments.push(copy);
        }
        Ok(new_id)
    }

    async fn overwrite_cell(
        &self,
        schedule_id: i64,
        employee_id: i64,
        date: NaiveDate,
        job_category_id: Option<i64>,
        work_type: WorkType,
    ) -> DomainResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.assignments.iter_mut().find(|a| {
            a.schedule_id == schedule_id && a.employee_id == employee_id && a.date == date
        }) {
            Some(assignment) => {
                assignment.job_category_id = job_category_id;
                assignment.work_type = work_type;
                assignment.headcount_value = work_type.headcount_value();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_status(&self, schedule_id: i64, status: ScheduleStatus) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        let schedule = state
            .schedules
            .iter_mut()
            .find(|s| s.id == schedule_id)
            .ok_or(DomainError::UnknownSchedule(schedule_id))?;
        schedule.status = status;
        if status == ScheduleStatus::Confirmed {
            schedule.confirmed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_schedule(&self, schedule_id: i64) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.schedules.retain(|s| s.id != schedule_id);
        state.assignments.retain(|a| a.schedule_id != schedule_id);
        state.patch_logs.retain(|l| l.schedule_id != schedule_id);
        Ok(())
    }

    async fn create_patch_log(
        &self,
        schedule_id: i64,
        input_text: &str,
        parsed_instruction: &str,
    ) -> DomainResult<i64> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_log_id;
        state.next_log_id += 1;
        state.patch_logs.push(PatchLog {
            id,
            schedule_id,
            input_text: input_text.to_string(),
            parsed_instruction: Some(parsed_instruction.to_string()),
            status: PatchStatus::Pending,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn find_patch_log(&self, log_id: i64) -> DomainResult<Option<PatchLog>> {
        let state = self.state.lock().unwrap();
        Ok(state.patch_logs.iter().find(|l| l.id == log_id).cloned())
    }

    async fn update_patch_log(
        &self,
        log_id: i64,
        parsed_instruction: Option<&str>,
        status: Option<PatchStatus>,
    ) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        let log = state
            .patch_logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .ok_or_else(|| DomainError::InvalidInput(format!("Patch log not found: {log_id}")))?;
        if let Some(parsed) = parsed_instruction {
            log.parsed_instruction = Some(parsed.to_string());
        }
        if let Some(status) = status {
            log.status = status;
        }
        Ok(())
    }

    async fn cleanup_before(&self, cutoff_month: &str) -> DomainResult<u64> {
        let mut state = self.state.lock().unwrap();
        let stale: Vec<i64> = state
            .schedules
            .iter()
            .filter(|s| s.target_month.as_str() < cutoff_month)
            .map(|s| s.id)
            .collect();
        for schedule_id in &stale {
            state.schedules.retain(|s| s.id != *schedule_id);
            state.assignments.retain(|a| a.schedule_id != *schedule_id);
            state.patch_logs.retain(|l| l.schedule_id != *schedule_id);
        }
        Ok(stale.len() as u64)
    }
}

/// The comparable content of an assignment row, ignoring row and schedule
/// ids. Headcount is doubled into an integer so cells stay `Eq`.
pub fn cell(a: &Assignment) -> (i64, NaiveDate, Option<i64>, WorkType, i64) {
    (
        a.employee_id,
        a.date,
        a.job_category_id,
        a.work_type,
        (a.headcount_value * 2.0).round() as i64,
    )
}

pub fn cells(assignments: &[Assignment]) -> Vec<(i64, NaiveDate, Option<i64>, WorkType, i64)> {
    let mut out: Vec<_> = assignments.iter().map(cell).collect();
    // (employee, date) is unique within a schedule
    out.sort_by_key(|c| (c.0, c.1));
    out
}

/// Check the universal output invariants: completeness, non-working
/// projection, day-off and half-day respect, qualifications, and headcount
/// consistency.
pub fn assert_assignment_invariants(instance: &ProblemInstance, assignments: &[Assignment]) {
    use std::collections::HashSet;

    let expected = instance.employees.len() * instance.all_dates.len();
    assert_eq!(assignments.len(), expected, "one assignment per (employee, date)");

    let mut seen = HashSet::new();
    for a in assignments {
        assert!(
            seen.insert((a.employee_id, a.date)),
            "duplicate assignment for ({}, {})",
            a.employee_id,
            a.date
        );
    }

    // union the requested periods per (employee, date)
    let mut requested: HashMap<(i64, NaiveDate), (bool, bool)> = HashMap::new();
    for req in &instance.day_off_requests {
        let entry = requested.entry((req.employee_id, req.date)).or_default();
        match req.period {
            shared::OffPeriod::Am => entry.0 = true,
            shared::OffPeriod::Pm => entry.1 = true,
            shared::OffPeriod::AllDay => *entry = (true, true),
        }
    }

    for a in assignments {
        if !instance.is_working_date(a.date) {
            assert_eq!(a.work_type, WorkType::Off, "non-working date must be off");
            assert_eq!(a.job_category_id, None);
            assert_eq!(a.headcount_value, 0.0);
            continue;
        }

        match requested.get(&(a.employee_id, a.date)) {
            Some((true, true)) => {
                assert_eq!(a.work_type, WorkType::Off, "full day off must be respected")
            }
            Some((true, false)) => assert!(
                a.work_type == WorkType::Off || a.work_type == WorkType::AfternoonHalf,
                "am off allows only afternoon work"
            ),
            Some((false, true)) => assert!(
                a.work_type == WorkType::Off || a.work_type == WorkType::MorningHalf,
                "pm off allows only morning work"
            ),
            _ => {}
        }

        if let Some(category_id) = a.job_category_id {
            assert!(
                instance.is_qualified(a.employee_id, category_id),
                "employee {} is not qualified for category {}",
                a.employee_id,
                category_id
            );
        }

        match a.work_type {
            WorkType::Off => {
                assert_eq!(a.headcount_value, 0.0);
                assert_eq!(a.job_category_id, None);
            }
            WorkType::Full => {
                assert_eq!(a.headcount_value, 1.0);
                assert!(a.job_category_id.is_some());
            }
            WorkType::MorningHalf | WorkType::AfternoonHalf => {
                assert_eq!(a.headcount_value, 0.5);
                assert!(a.job_category_id.is_some());
            }
        }
    }
}

/// Check that a violation line exists for exactly the under-supplied
/// (date, category) requirement pairs.
pub fn assert_violation_soundness(
    instance: &ProblemInstance,
    assignments: &[Assignment],
    violations: &[String],
) {
    for req in &instance.requirements {
        if !instance.is_working_date(req.date) {
            continue;
        }
        let supplied: f64 = assignments
            .iter()
            .filter(|a| a.date == req.date && a.job_category_id == Some(req.job_category_id))
            .map(|a| a.headcount_value)
            .sum();
        let prefix = format!("{} - job_type {}:", req.date, req.job_category_id);
        let reported = violations.iter().any(|v| v.starts_with(&prefix));
        assert_eq!(
            reported,
            supplied < req.required_count,
            "violation reporting mismatch for {prefix} (supplied {supplied}, needed {})",
            req.required_count
        );
    }
}
