use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub solver: SolverSettings,
    pub oracle: OracleSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolverSettings {
    /// Wall-clock cap on one solver invocation, in seconds.
    pub time_limit_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OracleSettings {
    /// Model id passed to the Anthropic Messages API.
    pub model: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .set_default("database.max_connections", 5)?
            .set_default("solver.time_limit_secs", 30)?
            .set_default("oracle.model", "claude-sonnet-4-20250514")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn solver_time_limit(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.solver.time_limit_secs)
    }
}
