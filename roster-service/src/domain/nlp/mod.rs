pub mod edits;
pub mod engine;
pub mod oracle;

pub use edits::{AdjustAction, AdjustEdit, PinEdit, ScheduleEdit};
pub use engine::{PatchChange, PatchEngine, PatchOutcome};
pub use oracle::{ModificationOracle, OracleRequest};
