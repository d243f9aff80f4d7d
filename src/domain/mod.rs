//! Domain types
//!
//! The canonical shapes shared by the store, the oracle wire contract, and
//! the lifecycle controller. All records serialize camelCase so the two
//! persisted files and the oracle responses share one schema.

mod checkin;
mod plan;
mod profile;

pub use checkin::CheckIn;
pub use plan::{DayPlan, Effort, StrategicOverview, StudyPlan, Task, TaskType, TopicNote};
pub use profile::{Profile, StressLevel, Subject};

#[cfg(test)]
pub(crate) use plan::sample_plan;
