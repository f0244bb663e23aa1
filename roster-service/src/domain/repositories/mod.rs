pub mod schedule_store;

pub use schedule_store::ScheduleStore;
