//! RescuePlan - exam-prep rescue planner
//!
//! Builds a day-by-day study plan for an imminent exam and adapts it after
//! each end-of-day check-in. The plan itself comes from an LLM; this crate
//! owns everything around it.
//!
//! # Core Concepts
//!
//! - **Plan as Record**: The current plan and profile live as two JSON
//!   records on disk; each oracle cycle replaces the plan wholesale
//! - **Untrusted Oracle**: Every oracle response is validated before it can
//!   become the authoritative plan
//! - **Failure Keeps the Old Plan**: A failed adaptation never destroys the
//!   plan the user already has
//!
//! # Modules
//!
//! - [`domain`] - Profile, plan, and check-in types
//! - [`lifecycle`] - State machine and actor driving the plan lifecycle
//! - [`oracle`] - Plan oracle trait and Anthropic implementation
//! - [`reconcile`] - Request building and response validation
//! - [`store`] - JSON record persistence
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod lifecycle;
pub mod oracle;
pub mod reconcile;
pub mod repl;
pub mod store;

// Re-export commonly used types
pub use config::{Config, OracleConfig, StorageConfig};
pub use domain::{CheckIn, DayPlan, Effort, Profile, StressLevel, StudyPlan, Subject, Task, TaskType};
pub use lifecycle::{LifecycleError, LifecycleManager, Phase, Snapshot};
pub use oracle::{AnthropicOracle, OracleError, PlanOracle, create_oracle};
pub use reconcile::{ValidationError, validate_plan};
pub use store::PlanStore;
