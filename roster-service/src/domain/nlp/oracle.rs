use async_trait::async_trait;
use shared::DomainResult;

use super::edits::ScheduleEdit;

/// The four textual inputs handed to the oracle alongside the instruction.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// The user's free-text modification request.
    pub instruction: String,
    /// Per-employee monthly counts of the current schedule.
    pub current_summary: String,
    /// Per-employee day-by-day rendering of the current schedule.
    pub schedule_detail: String,
    /// Target month in "YYYY-MM" form, so short dates resolve correctly.
    pub target_month: String,
}

/// Turns a free-text instruction into a structured edit list. Any component
/// satisfying this contract works; production uses the Anthropic Messages
/// API, tests a mock with a canned list.
#[async_trait]
pub trait ModificationOracle: Send + Sync {
    async fn parse_instruction(&self, request: OracleRequest) -> DomainResult<Vec<ScheduleEdit>>;
}
