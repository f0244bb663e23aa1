use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared::ScheduleStatus;

use roster_service::domain::calendar::retention_cutoff;
use roster_service::domain::nlp::PatchEngine;
use roster_service::domain::optimizer::ScheduleOptimizer;
use roster_service::domain::reporting::build_report;
use roster_service::domain::repositories::ScheduleStore;
use roster_service::infrastructure::config::Settings;
use roster_service::infrastructure::database;
use roster_service::infrastructure::oracle::AnthropicOracle;
use roster_service::infrastructure::repositories::PostgresScheduleStore;

const RETENTION_MONTHS: u32 = 13;

const USAGE: &str = "usage: roster-service generate <YYYY-MM>
       roster-service modify <schedule-id> <instruction>
       roster-service status <schedule-id> <draft|preview|confirmed|published>";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str);

    // Load configuration
    let settings = Settings::new()?;
    tracing::info!("Configuration loaded");

    // Initialize database pool
    let pool =
        database::create_pool(&settings.database.url, settings.database.max_connections).await?;
    tracing::info!("Database connection pool created");

    // Run migrations
    database::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let store = Arc::new(PostgresScheduleStore::new(pool));

    // Drop data past the retention horizon before doing anything new
    let cutoff = retention_cutoff(chrono::Utc::now().date_naive(), RETENTION_MONTHS);
    store.cleanup_before(&cutoff).await?;

    let optimizer = ScheduleOptimizer::new(store.clone(), settings.solver_time_limit());

    match command {
        Some("generate") => {
            let month = args.get(1).ok_or_else(|| anyhow::anyhow!(USAGE))?;
            let generated = optimizer.generate(month, &[]).await?;

            tracing::info!(
                "Schedule {} for {} generated with {} assignments",
                generated.schedule_id,
                month,
                generated.assignments.len()
            );
            for violation in &generated.violations {
                tracing::warn!("Staffing shortage: {}", violation);
            }

            let instance = store.load_problem_instance(month).await?;
            let report = build_report(
                month,
                &instance.employees,
                &instance.categories,
                &generated.assignments,
                &instance.work_targets,
                &instance.working_dates,
            );
            for employee in &report.employees {
                tracing::info!(
                    "{}: {} work days, {} days off",
                    employee.employee_name,
                    employee.total_work_days,
                    employee.total_days_off
                );
            }
            tracing::info!(
                "Work-day spread: max {} / min {} (diff {})",
                report.fairness_max,
                report.fairness_min,
                report.fairness_diff
            );
        }
        Some("modify") => {
            let schedule_id: i64 = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!(USAGE))?
                .parse()?;
            let instruction = args.get(2..).unwrap_or(&[]).join(" ");
            if instruction.is_empty() {
                anyhow::bail!(USAGE);
            }

            let oracle = Arc::new(AnthropicOracle::from_env(settings.oracle.model.clone())?);
            let engine = PatchEngine::new(store.clone(), oracle, optimizer);
            let outcome = engine.modify(schedule_id, &instruction).await?;

            tracing::info!(
                "Patch log {} produced schedule {} with {} change(s)",
                outcome.log_id,
                outcome.new_schedule_id,
                outcome.changes.len()
            );
            for change in &outcome.changes {
                tracing::info!(
                    "{} {}: {} -> {}",
                    change.employee_name,
                    change.date,
                    change.old_job_type,
                    change.new_job_type
                );
            }
            for violation in &outcome.violations {
                tracing::warn!("Staffing shortage: {}", violation);
            }
        }
        Some("status") => {
            let schedule_id: i64 = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!(USAGE))?
                .parse()?;
            let status: ScheduleStatus = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!(USAGE))?
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid status"))?;
            store.update_status(schedule_id, status).await?;
            tracing::info!("Schedule {} is now {:?}", schedule_id, status);
        }
        _ => anyhow::bail!(USAGE),
    }

    Ok(())
}
