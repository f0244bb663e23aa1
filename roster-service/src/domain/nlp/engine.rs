use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::{DomainError, DomainResult, PatchStatus, WorkType};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{Assignment, Employee, JobCategory};
use crate::domain::optimizer::ScheduleOptimizer;
use crate::domain::repositories::ScheduleStore;

use super::edits::{AdjustEdit, PinEdit, ScheduleEdit, REST_LABEL};
use super::oracle::{ModificationOracle, OracleRequest};

/// One cell whose category changed between the old and the new schedule.
#[derive(Debug, Clone, Serialize)]
pub struct PatchChange {
    pub employee_id: i64,
    pub employee_name: String,
    pub date: NaiveDate,
    pub old_job_type: String,
    pub new_job_type: String,
}

/// Result of one natural-language modification.
#[derive(Debug)]
pub struct PatchOutcome {
    pub log_id: i64,
    pub new_schedule_id: i64,
    pub edits: Vec<ScheduleEdit>,
    pub changes: Vec<PatchChange>,
    pub violations: Vec<String>,
}

/// Applies oracle-derived edits to a schedule: pins by cloning and
/// overwriting cells, adjusts by re-solving with extra bounds. Every patch
/// produces a new schedule and a log row; "reject" deletes the schedule
/// again.
pub struct PatchEngine {
    store: Arc<dyn ScheduleStore>,
    oracle: Arc<dyn ModificationOracle>,
    optimizer: ScheduleOptimizer,
}

impl PatchEngine {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        oracle: Arc<dyn ModificationOracle>,
        optimizer: ScheduleOptimizer,
    ) -> Self {
        Self {
            store,
            oracle,
            optimizer,
        }
    }

    pub async fn modify(&self, schedule_id: i64, input_text: &str) -> DomainResult<PatchOutcome> {
        let schedule = self
            .store
            .find_schedule(schedule_id)
            .await?
            .ok_or(DomainError::UnknownSchedule(schedule_id))?;

        let old_assignments = self.store.assignments_for(schedule_id).await?;
        let employees = self.store.list_employees().await?;
        let categories = self.store.list_categories().await?;
        let category_names: HashMap<i64, String> =
            categories.iter().map(|c| (c.id, c.name.clone())).collect();

        let current_summary = render_summary(&employees, &category_names, &old_assignments);
        let schedule_detail = render_schedule_detail(&employees, &category_names, &old_assignments);

        let edits = self
            .oracle
            .parse_instruction(OracleRequest {
                instruction: input_text.to_string(),
                current_summary,
                schedule_detail,
                target_month: schedule.target_month.clone(),
            })
            .await?;

        let parsed_json = serde_json::to_string(&edits)
            .map_err(|e| DomainError::ParseFailed(e.to_string()))?;
        let log_id = self
            .store
            .create_patch_log(schedule_id, input_text, &parsed_json)
            .await?;

        let mut pins: Vec<PinEdit> = Vec::new();
        let mut adjusts: Vec<AdjustEdit> = Vec::new();
        for edit in &edits {
            match edit {
                ScheduleEdit::Pin(pin) => pins.push(pin.clone()),
                ScheduleEdit::Adjust(adjust) => adjusts.push(adjust.clone()),
            }
        }

        let (new_schedule_id, violations) = if !pins.is_empty() && adjusts.is_empty() {
            // Targeted edits only: no re-solve, copy the schedule and
            // overwrite the named cells
            tracing::info!("Applying {} pin(s) to a clone of schedule {}", pins.len(), schedule_id);
            let new_id = self.store.clone_schedule(schedule_id).await?;
            self.apply_pins(new_id, &pins, &employees, &categories)
                .await?;
            (new_id, Vec::new())
        } else {
            tracing::info!(
                "Re-solving {} with {} adjustment hint(s)",
                schedule.target_month,
                adjusts.len()
            );
            let generated = self
                .optimizer
                .generate(&schedule.target_month, &adjusts)
                .await?;
            if !pins.is_empty() {
                self.apply_pins(generated.schedule_id, &pins, &employees, &categories)
                    .await?;
            }
            (generated.schedule_id, generated.violations)
        };

        let new_assignments = self.store.assignments_for(new_schedule_id).await?;
        let changes = compute_changes(
            &employees,
            &category_names,
            &old_assignments,
            &new_assignments,
        );

        let updated = serde_json::json!({
            "constraints": edits,
            "new_schedule_id": new_schedule_id,
            "changes_count": changes.len(),
        });
        self.store
            .update_patch_log(log_id, Some(&updated.to_string()), None)
            .await?;

        Ok(PatchOutcome {
            log_id,
            new_schedule_id,
            edits,
            changes,
            violations,
        })
    }

    /// Overwrite pinned cells. Unknown employees or categories and missing
    /// cells are skipped; pins never produce a half-day.
    async fn apply_pins(
        &self,
        schedule_id: i64,
        pins: &[PinEdit],
        employees: &[Employee],
        categories: &[JobCategory],
    ) -> DomainResult<()> {
        for pin in pins {
            let Some(employee) = employees.iter().find(|e| e.name == pin.employee_name) else {
                tracing::warn!("Skipping pin for unknown employee {:?}", pin.employee_name);
                continue;
            };

            let (category_id, work_type) = if pin.new_job_type == REST_LABEL {
                (None, WorkType::Off)
            } else {
                match categories.iter().find(|c| c.name == pin.new_job_type) {
                    Some(category) => (Some(category.id), WorkType::Full),
                    None => {
                        tracing::warn!("Skipping pin for unknown category {:?}", pin.new_job_type);
                        continue;
                    }
                }
            };

            let overwritten = self
                .store
                .overwrite_cell(schedule_id, employee.id, pin.date, category_id, work_type)
                .await?;
            if !overwritten {
                tracing::warn!(
                    "No cell for {} on {} in schedule {}; pin skipped",
                    employee.name,
                    pin.date,
                    schedule_id
                );
            }
        }
        Ok(())
    }

    /// Mark a patch as accepted. The schedule it produced stays.
    pub async fn approve(&self, log_id: i64) -> DomainResult<()> {
        self.require_log(log_id).await?;
        self.store
            .update_patch_log(log_id, None, Some(PatchStatus::Approved))
            .await
    }

    /// Discard a patch: delete the schedule it produced (with its
    /// assignments) and mark the log rejected.
    pub async fn reject(&self, log_id: i64) -> DomainResult<()> {
        let log = self.require_log(log_id).await?;

        if let Some(parsed) = &log.parsed_instruction {
            let new_schedule_id = serde_json::from_str::<serde_json::Value>(parsed)
                .ok()
                .and_then(|v| v.get("new_schedule_id").and_then(|id| id.as_i64()));
            if let Some(schedule_id) = new_schedule_id {
                if self.store.find_schedule(schedule_id).await?.is_some() {
                    self.store.delete_schedule(schedule_id).await?;
                }
            }
        }

        self.store
            .update_patch_log(log_id, None, Some(PatchStatus::Rejected))
            .await
    }

    async fn require_log(&self, log_id: i64) -> DomainResult<crate::domain::entities::PatchLog> {
        self.store
            .find_patch_log(log_id)
            .await?
            .ok_or_else(|| DomainError::InvalidInput(format!("Patch log not found: {log_id}")))
    }
}

/// Per-employee monthly counts, one line each:
/// `- <name>: 出勤<n>日 (<category>: <n>日, …)`.
fn render_summary(
    employees: &[Employee],
    category_names: &HashMap<i64, String>,
    assignments: &[Assignment],
) -> String {
    let mut lines = Vec::with_capacity(employees.len());
    for employee in employees {
        let working: Vec<&Assignment> = assignments
            .iter()
            .filter(|a| a.employee_id == employee.id && a.work_type.is_working())
            .collect();

        // first-seen order so the line is stable across runs
        let mut counts: Vec<(String, u32)> = Vec::new();
        for assignment in &working {
            let name = assignment
                .job_category_id
                .and_then(|id| category_names.get(&id).cloned())
                .unwrap_or_else(|| "不明".to_string());
            match counts.iter_mut().find(|(n, _)| *n == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name, 1)),
            }
        }
        let counts_str = counts
            .iter()
            .map(|(name, count)| format!("{name}: {count}日"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!(
            "- {}: 出勤{}日 ({})",
            employee.name,
            working.len(),
            counts_str
        ));
    }
    lines.join("\n")
}

/// Per-employee day-by-day rendering, one line each:
/// `<name>: 3/2=データ, 3/3=休み, …`.
fn render_schedule_detail(
    employees: &[Employee],
    category_names: &HashMap<i64, String>,
    assignments: &[Assignment],
) -> String {
    let mut lines = Vec::with_capacity(employees.len());
    for employee in employees {
        let mut cells: Vec<&Assignment> = assignments
            .iter()
            .filter(|a| a.employee_id == employee.id)
            .collect();
        cells.sort_by_key(|a| a.date);

        let rendered = cells
            .iter()
            .map(|a| {
                let label = a
                    .job_category_id
                    .filter(|_| a.work_type.is_working())
                    .and_then(|id| category_names.get(&id).map(String::as_str))
                    .unwrap_or(REST_LABEL);
                format!("{}/{}={}", a.date.month(), a.date.day(), label)
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("{}: {}", employee.name, rendered));
    }
    lines.join("\n")
}

/// Every (employee, date) whose category differs between the two schedules,
/// with human-readable old/new names (`休み` for none).
fn compute_changes(
    employees: &[Employee],
    category_names: &HashMap<i64, String>,
    old_assignments: &[Assignment],
    new_assignments: &[Assignment],
) -> Vec<PatchChange> {
    let employee_names: HashMap<i64, &str> =
        employees.iter().map(|e| (e.id, e.name.as_str())).collect();
    let old_map: HashMap<(i64, NaiveDate), Option<i64>> = old_assignments
        .iter()
        .map(|a| ((a.employee_id, a.date), a.job_category_id))
        .collect();

    let label = |id: Option<i64>| -> String {
        id.and_then(|id| category_names.get(&id).cloned())
            .unwrap_or_else(|| REST_LABEL.to_string())
    };

    let mut changes = Vec::new();
    for assignment in new_assignments {
        let key = (assignment.employee_id, assignment.date);
        let old_job = old_map.get(&key).copied().flatten();
        if old_job != assignment.job_category_id {
            changes.push(PatchChange {
                employee_id: assignment.employee_id,
                employee_name: employee_names
                    .get(&assignment.employee_id)
                    .unwrap_or(&"")
                    .to_string(),
                date: assignment.date,
                old_job_type: label(old_job),
                new_job_type: label(assignment.job_category_id),
            });
        }
    }
    changes
}
