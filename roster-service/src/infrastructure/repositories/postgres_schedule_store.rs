use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{DomainError, DomainResult, PatchStatus, ScheduleStatus, WorkType};
use sqlx::PgPool;
use std::collections::HashMap;

use crate::domain::calendar::ScheduleMonth;
use crate::domain::entities::{
    Assignment, DailyRequirement, DayAssignment, DayOffRequest, Employee, JobCategory, PatchLog,
    Schedule, WorkTarget,
};
use crate::domain::optimizer::problem::ProblemInstance;
use crate::domain::repositories::ScheduleStore;

pub struct PostgresScheduleStore {
    pool: PgPool,
}

impl PostgresScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::Database(e.to_string())
}

#[async_trait]
impl ScheduleStore for PostgresScheduleStore {
    async fn load_problem_instance(&self, month: &str) -> DomainResult<ProblemInstance> {
        let month = ScheduleMonth::parse(month)?;

        let employees = self.list_employees().await?;
        let categories = self.list_categories().await?;

        let qualification_rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT employee_id, job_category_id
            FROM employee_qualifications
            ORDER BY employee_id, job_category_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut qualifications: HashMap<i64, Vec<i64>> = HashMap::new();
        for (employee_id, job_category_id) in qualification_rows {
            qualifications
                .entry(employee_id)
                .or_default()
                .push(job_category_id);
        }

        let day_off_requests = sqlx::query_as::<_, DayOffRequest>(
            r#"
            SELECT sr.employee_id, rd.date, rd.period
            FROM request_details rd
            JOIN shift_requests sr ON sr.id = rd.shift_request_id
            WHERE sr.target_month = $1
            ORDER BY sr.employee_id, rd.date
            "#,
        )
        .bind(month.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let target_rows = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT employee_id, requested_work_days
            FROM shift_requests
            WHERE target_month = $1 AND requested_work_days IS NOT NULL
            "#,
        )
        .bind(month.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut work_targets: HashMap<i64, WorkTarget> = HashMap::new();
        for (employee_id, raw) in target_rows {
            // unparseable targets are treated as absent
            if let Ok(target) = raw.parse::<WorkTarget>() {
                work_targets.insert(employee_id, target);
            }
        }

        let requirements = sqlx::query_as::<_, DailyRequirement>(
            r#"
            SELECT date, job_category_id, required_count
            FROM daily_requirements
            WHERE date >= $1 AND date <= $2
            ORDER BY date, job_category_id
            "#,
        )
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(ProblemInstance {
            all_dates: month.dates(),
            working_dates: month.working_dates(),
            month,
            employees,
            categories,
            qualifications,
            day_off_requests,
            work_targets,
            requirements,
        })
    }

    async fn list_employees(&self) -> DomainResult<Vec<Employee>> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, employment_type, sort_order
            FROM employees
            ORDER BY sort_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn list_categories(&self) -> DomainResult<Vec<JobCategory>> {
        sqlx::query_as::<_, JobCategory>(
            r#"
            SELECT id, name
            FROM job_categories
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn find_schedule(&self, schedule_id: i64) -> DomainResult<Option<Schedule>> {
        sqlx::query_as::<_, Schedule>(
            r#"
            SELECT id, target_month, status, generated_at, confirmed_at
            FROM schedules
            WHERE id = $1
            "#,
        )
        .bind(schedule_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn latest_schedule_for_month(&self, month: &str) -> DomainResult<Option<Schedule>> {
        sqlx::query_as::<_, Schedule>(
            r#"
            SELECT id, target_month, status, generated_at, confirmed_at
            FROM schedules
            WHERE target_month = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(month)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn assignments_for(&self, schedule_id: i64) -> DomainResult<Vec<Assignment>> {
        sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, schedule_id, employee_id, date, job_category_id, work_type, headcount_value
            FROM shift_assignments
            WHERE schedule_id = $1
            ORDER BY employee_id, date
            "#,
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn persist_schedule(
        &self,
        month: &str,
        assignments: &[DayAssignment],
    ) -> DomainResult<i64> {
        let mut transaction = self.pool.begin().await.map_err(db_err)?;

        let schedule_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO schedules (target_month, status, generated_at)
            VALUES ($1, $2, NOW())
            RETURNING id
            "#,
        )
        .bind(month)
        .bind(ScheduleStatus::Preview)
        .fetch_one(&mut *transaction)
        .await
        .map_err(db_err)?;

        for assignment in assignments {
            sqlx::query(
                r#"
                INSERT INTO shift_assignments
                    (schedule_id, employee_id, date, job_category_id, work_type, headcount_value)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(schedule_id)
            .bind(assignment.employee_id)
            .bind(assignment.date)
            .bind(assignment.job_category_id)
            .bind(assignment.work_type)
            .bind(assignment.headcount_value)
            .execute(&mut *transaction)
            .await
            .map_err(db_err)?;
        }

        transaction.commit().await.map_err(db_err)?;
        Ok(schedule_id)
    }

    async fn clone_schedule(&self, schedule_id: i64) -> DomainResult<i64> {
        let mut transaction = self.pool.begin().await.map_err(db_err)?;

        let target_month = sqlx::query_scalar::<_, String>(
            r#"
            SELECT target_month FROM schedules WHERE id = $1
            "#,
        )
        .bind(schedule_id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(db_err)?
        .ok_or(DomainError::UnknownSchedule(schedule_id))?;

        let new_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO schedules (target_month, status, generated_at)
            VALUES ($1, $2, NOW())
            RETURNING id
            "#,
        )
        .bind(target_month)
        .bind(ScheduleStatus::Preview)
        .fetch_one(&mut *transaction)
        .await
        .map_err(db_err)?;

        sqlx::query(
            r#"
            INSERT INTO shift_assignments
                (schedule_id, employee_id, date, job_category_id, work_type, headcount_value)
            SELECT $1, employee_id, date, job_category_id, work_type, headcount_value
            FROM shift_assignments
            WHERE schedule_id = $2
            "#,
        )
        .bind(new_id)
        .bind(schedule_id)
        .execute(&mut *transaction)
        .await
        .map_err(db_err)?;

        transaction.commit().await.map_err(db_err)?;
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
        let result = sqlx::query(
            r#"
            UPDATE shift_assignments
            SET job_category_id = $4, work_type = $5, headcount_value = $6
            WHERE schedule_id = $1 AND employee_id = $2 AND date = $3
            "#,
        )
        .bind(schedule_id)
        .bind(employee_id)
        .bind(date)
        .bind(job_category_id)
        .bind(work_type)
        .bind(work_type.headcount_value())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_status(&self, schedule_id: i64, status: ScheduleStatus) -> DomainResult<()> {
        let query = if status == ScheduleStatus::Confirmed {
            r#"
            UPDATE schedules SET status = $1, confirmed_at = NOW() WHERE id = $2
            "#
        } else {
            r#"
            UPDATE schedules SET status = $1 WHERE id = $2
            "#
        };

        let result = sqlx::query(query)
            .bind(status)
            .bind(schedule_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UnknownSchedule(schedule_id));
        }
        Ok(())
    }

    async fn delete_schedule(&self, schedule_id: i64) -> DomainResult<()> {
        sqlx::query(
            r#"
            DELETE FROM schedules WHERE id = $1
            "#,
        )
        .bind(schedule_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn create_patch_log(
        &self,
        schedule_id: i64,
        input_text: &str,
        parsed_instruction: &str,
    ) -> DomainResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO patch_logs (schedule_id, input_text, parsed_instruction, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(schedule_id)
        .bind(input_text)
        .bind(parsed_instruction)
        .bind(PatchStatus::Pending)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn find_patch_log(&self, log_id: i64) -> DomainResult<Option<PatchLog>> {
        sqlx::query_as::<_, PatchLog>(
            r#"
            SELECT id, schedule_id, input_text, parsed_instruction, status, created_at
            FROM patch_logs
            WHERE id = $1
            "#,
        )
        .bind(log_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn update_patch_log(
        &self,
        log_id: i64,
        parsed_instruction: Option<&str>,
        status: Option<PatchStatus>,
    ) -> DomainResult<()> {
        match (parsed_instruction, status) {
            (Some(parsed), Some(status)) => {
                sqlx::query(
                    r#"
                    UPDATE patch_logs SET parsed_instruction = $1, status = $2 WHERE id = $3
                    "#,
                )
                .bind(parsed)
                .bind(status)
                .bind(log_id)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
            }
            (Some(parsed), None) => {
                sqlx::query(
                    r#"
                    UPDATE patch_logs SET parsed_instruction = $1 WHERE id = $2
                    "#,
                )
                .bind(parsed)
                .bind(log_id)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
            }
            (None, Some(status)) => {
                sqlx::query(
                    r#"
                    UPDATE patch_logs SET status = $1 WHERE id = $2
                    "#,
                )
                .bind(status)
                .bind(log_id)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
            }
            (None, None) => {}
        }
        Ok(())
    }

    async fn cleanup_before(&self, cutoff_month: &str) -> DomainResult<u64> {
        let cutoff = ScheduleMonth::parse(cutoff_month)?;
        let mut transaction = self.pool.begin().await.map_err(db_err)?;

        let schedules = sqlx::query(
            r#"
            DELETE FROM schedules WHERE target_month < $1
            "#,
        )
        .bind(cutoff_month)
        .execute(&mut *transaction)
        .await
        .map_err(db_err)?
        .rows_affected();

        let requests = sqlx::query(
            r#"
            DELETE FROM shift_requests WHERE target_month < $1
            "#,
        )
        .bind(cutoff_month)
        .execute(&mut *transaction)
        .await
        .map_err(db_err)?
        .rows_affected();

        let requirements = sqlx::query(
            r#"
            DELETE FROM daily_requirements WHERE date < $1
            "#,
        )
        .bind(cutoff.first_day())
        .execute(&mut *transaction)
        .await
        .map_err(db_err)?
        .rows_affected();

        transaction.commit().await.map_err(db_err)?;

        let removed = schedules + requests + requirements;
        if removed > 0 {
            tracing::info!(
                "Retention cleanup removed {} schedules, {} requests, {} requirement rows",
                schedules,
                requests,
                requirements
            );
        }
        Ok(removed)
    }
}
