pub mod model;
pub mod problem;
pub mod projector;
pub mod solver;
pub mod violations;

use std::sync::Arc;
use std::time::Duration;

use shared::{DomainError, DomainResult};

use crate::domain::entities::Assignment;
use crate::domain::nlp::edits::AdjustEdit;
use crate::domain::repositories::ScheduleStore;

use model::build_model;
use problem::OffCalendar;
use projector::project_assignments;
use solver::solve_model;
use violations::collect_violations;

/// Result of one optimizer run: the persisted schedule, its assignments, and
/// any staffing shortages that remained.
#[derive(Debug)]
pub struct GeneratedSchedule {
    pub schedule_id: i64,
    pub assignments: Vec<Assignment>,
    pub violations: Vec<String>,
}

/// Orchestrates one schedule generation: load the problem instance, solve the
/// constraint model, project the solution onto per-day assignments, and
/// persist the schedule atomically.
pub struct ScheduleOptimizer {
    store: Arc<dyn ScheduleStore>,
    time_limit: Duration,
}

impl ScheduleOptimizer {
    pub fn new(store: Arc<dyn ScheduleStore>, time_limit: Duration) -> Self {
        Self { store, time_limit }
    }

    pub async fn generate(
        &self,
        month: &str,
        adjustments: &[AdjustEdit],
    ) -> DomainResult<GeneratedSchedule> {
        let instance = self.store.load_problem_instance(month).await?;
        instance.validate()?;

        tracing::info!(
            "Solving {} for {} employees over {} working dates",
            month,
            instance.employees.len(),
            instance.working_dates.len()
        );

        let adjustments = adjustments.to_vec();
        let handle = tokio::task::spawn_blocking(move || {
            let off = OffCalendar::from_requests(&instance.day_off_requests);
            let parts = build_model(&instance, &off, &adjustments);
            let assigned = solve_model(parts)?;
            Ok::<_, DomainError>((instance, off, assigned))
        });

        let (instance, off, assigned) = match tokio::time::timeout(self.time_limit, handle).await {
            Err(_) => {
                return Err(DomainError::Infeasible(
                    "solver wall-clock limit exceeded".to_string(),
                ))
            }
            Ok(Err(join_err)) => return Err(DomainError::Infeasible(join_err.to_string())),
            Ok(Ok(solved)) => solved?,
        };

        let assignments = project_assignments(&instance, &off, &assigned);
        let violations = collect_violations(&instance, &off, &assigned);

        let schedule_id = self
            .store
            .persist_schedule(&instance.month.to_string(), &assignments)
            .await?;
        let persisted = self.store.assignments_for(schedule_id).await?;

        tracing::info!(
            "Persisted schedule {} with {} assignments ({} violations)",
            schedule_id,
            persisted.len(),
            violations.len()
        );

        Ok(GeneratedSchedule {
            schedule_id,
            assignments: persisted,
            violations,
        })
    }
}
