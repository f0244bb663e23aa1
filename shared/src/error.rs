use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No employees registered")]
    NoEmployees,

    #[error("No job categories assigned to any employee")]
    NoQualifications,

    #[error("Could not find a feasible schedule: {0}")]
    Infeasible(String),

    #[error("Schedule not found: {0}")]
    UnknownSchedule(i64),

    #[error("ANTHROPIC_API_KEY is not configured")]
    NlpNotConfigured,

    #[error("Modification oracle failed: {0}")]
    OracleFailure(String),

    #[error("Could not parse oracle response: {0}")]
    ParseFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
