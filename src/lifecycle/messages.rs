//! Lifecycle controller messages
//!
//! Commands and errors for the actor pattern. The presentation layer talks
//! to the controller exclusively through these.

use thiserror::Error;
use tokio::sync::oneshot;

use super::controller::Snapshot;
use crate::domain::{CheckIn, Profile, StudyPlan};
use crate::reconcile::ValidationError;

/// Errors surfaced by lifecycle operations
///
/// None of these are fatal to the process: a generate failure returns the
/// system to onboarding with no plan persisted, an adapt failure retains the
/// prior plan as authoritative.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Malformed onboarding input; local, never sent to the oracle
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Operation not valid in the current state or against its target;
    /// ignored rather than fatal
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A second check-in while one is outstanding; state unchanged
    #[error("An oracle request is already in flight")]
    OperationInProgress,

    /// Transport/timeout/oracle-side failure, sub-cause collapsed
    #[error("Plan oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Structurally malformed oracle response
    #[error("Oracle response rejected: {0}")]
    Validation(#[from] ValidationError),

    /// Store write failure; fatal for the operation, prior state retained
    #[error("Store error: {0}")]
    Store(String),

    /// Controller actor is gone
    #[error("Channel error")]
    Channel,
}

impl LifecycleError {
    /// Whether the failed cycle left the previous plan authoritative
    /// (oracle/validation failures do; local rejections never touched it)
    pub fn is_cycle_failure(&self) -> bool {
        matches!(self, Self::OracleUnavailable(_) | Self::Validation(_))
    }
}

/// Response from lifecycle operations
pub type LifecycleResponse<T> = Result<T, LifecycleError>;

/// Commands sent to the lifecycle actor
#[derive(Debug)]
pub enum LifecycleCommand {
    /// Onboarding complete: validate, persist, and generate the first plan
    SubmitProfile {
        profile: Profile,
        reply: oneshot::Sender<LifecycleResponse<()>>,
    },

    /// Toggle a day-1 task in the transient overlay
    ToggleTask {
        task_id: String,
        reply: oneshot::Sender<LifecycleResponse<bool>>,
    },

    /// End-of-day check-in: adapt and replace the plan wholesale
    SubmitCheckIn {
        check_in: CheckIn,
        reply: oneshot::Sender<LifecycleResponse<()>>,
    },

    /// Read-only view for rendering
    Snapshot { reply: oneshot::Sender<Snapshot> },

    /// Destroy both records and return to onboarding
    Reset {
        reply: oneshot::Sender<LifecycleResponse<()>>,
    },

    /// Internal: a spawned oracle call finished
    OracleDone {
        outcome: LifecycleResponse<StudyPlan>,
    },

    Shutdown,
}
