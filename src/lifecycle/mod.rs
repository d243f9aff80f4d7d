//! Plan lifecycle: onboarding, generation, daily tracking, adaptation
//!
//! [`Controller`] is the synchronous state machine over the persisted
//! records; [`LifecycleManager`] wraps it in an actor so oracle calls do not
//! block reads.

mod controller;
mod manager;
mod messages;

pub use controller::{Controller, Phase, Snapshot};
pub use manager::LifecycleManager;
pub use messages::{LifecycleCommand, LifecycleError, LifecycleResponse};
