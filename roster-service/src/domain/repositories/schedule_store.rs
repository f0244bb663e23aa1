use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{DomainResult, PatchStatus, ScheduleStatus, WorkType};

use crate::domain::entities::{Assignment, DayAssignment, Employee, JobCategory, PatchLog, Schedule};
use crate::domain::optimizer::problem::ProblemInstance;

/// Narrow persistence contract for the optimizer and the patch engine. Every
/// write method runs in a single transaction; on error nothing of the
/// operation remains visible.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Load everything one optimizer run consumes for the given "YYYY-MM".
    async fn load_problem_instance(&self, month: &str) -> DomainResult<ProblemInstance>;

    /// All employees in presentation order.
    async fn list_employees(&self) -> DomainResult<Vec<Employee>>;

    /// All job categories, ascending id (descending priority).
    async fn list_categories(&self) -> DomainResult<Vec<JobCategory>>;

    async fn find_schedule(&self, schedule_id: i64) -> DomainResult<Option<Schedule>>;

    /// The current (highest-id) schedule of a month, if any.
    async fn latest_schedule_for_month(&self, month: &str) -> DomainResult<Option<Schedule>>;

    /// Assignments of a schedule, ordered by employee then date.
    async fn assignments_for(&self, schedule_id: i64) -> DomainResult<Vec<Assignment>>;

    /// Write a new preview schedule and all its assignments as one unit.
    async fn persist_schedule(
        &self,
        month: &str,
        assignments: &[DayAssignment],
    ) -> DomainResult<i64>;

    /// Copy a schedule and its assignments into a new preview schedule.
    async fn clone_schedule(&self, schedule_id: i64) -> DomainResult<i64>;

    /// Overwrite one (employee, date) cell of a schedule. Returns false when
    /// no such cell exists.
    async fn overwrite_cell(
        &self,
        schedule_id: i64,
        employee_id: i64,
        date: NaiveDate,
        job_category_id: Option<i64>,
        work_type: WorkType,
    ) -> DomainResult<bool>;

    /// Set a schedule's status. Only the transition to `confirmed` stamps
    /// `confirmed_at`.
    async fn update_status(&self, schedule_id: i64, status: ScheduleStatus) -> DomainResult<()>;

    /// Delete a schedule and, by ownership, its assignments and patch logs.
    async fn delete_schedule(&self, schedule_id: i64) -> DomainResult<()>;

    async fn create_patch_log(
        &self,
        schedule_id: i64,
        input_text: &str,
        parsed_instruction: &str,
    ) -> DomainResult<i64>;

    async fn find_patch_log(&self, log_id: i64) -> DomainResult<Option<PatchLog>>;

    async fn update_patch_log(
        &self,
        log_id: i64,
        parsed_instruction: Option<&str>,
        status: Option<PatchStatus>,
    ) -> DomainResult<()>;

    /// Drop schedules, requests, and requirements older than the cutoff
    /// month ("YYYY-MM"). Returns the number of rows removed.
    async fn cleanup_before(&self, cutoff_month: &str) -> DomainResult<u64>;
}
