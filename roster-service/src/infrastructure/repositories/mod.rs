pub mod postgres_schedule_store;

pub use postgres_schedule_store::PostgresScheduleStore;
