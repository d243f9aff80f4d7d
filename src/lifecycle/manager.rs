//! LifecycleManager - actor that owns the Controller
//!
//! Processes presentation events via channels. Oracle calls are the only
//! suspension points and are spawned off the actor task, so while a call is
//! outstanding the actor keeps answering snapshots and toggles against the
//! current (pre-adaptation) state and rejects a second check-in. At most one
//! oracle call is ever in flight.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::controller::{Controller, Snapshot};
use super::messages::{LifecycleCommand, LifecycleError, LifecycleResponse};
use crate::domain::{CheckIn, Profile, StudyPlan};
use crate::oracle::PlanOracle;
use crate::reconcile::{self, AdaptRequest, GenerateRequest};
use crate::store::PlanStore;

/// Handle to send events to the lifecycle actor
#[derive(Clone)]
pub struct LifecycleManager {
    tx: mpsc::Sender<LifecycleCommand>,
}

impl LifecycleManager {
    /// Spawn the actor over a store and an injected oracle
    pub fn spawn(store: PlanStore, oracle: Arc<dyn PlanOracle>) -> Self {
        let controller = Controller::new(store);
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(actor_loop(controller, oracle, tx.clone(), rx));
        info!("LifecycleManager spawned");

        Self { tx }
    }

    /// Onboarding complete: persist the profile and generate the first plan
    ///
    /// Resolves when the generate cycle finishes, either way.
    pub async fn submit_profile(&self, profile: Profile) -> LifecycleResponse<()> {
        debug!(exam = %profile.exam_name, "submit_profile: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(LifecycleCommand::SubmitProfile { profile, reply: reply_tx })
            .await
            .map_err(|_| LifecycleError::Channel)?;
        reply_rx.await.map_err(|_| LifecycleError::Channel)?
    }

    /// Toggle a day-1 task; returns its effective completion state
    pub async fn toggle_task(&self, task_id: &str) -> LifecycleResponse<bool> {
        debug!(%task_id, "toggle_task: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(LifecycleCommand::ToggleTask {
                task_id: task_id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| LifecycleError::Channel)?;
        reply_rx.await.map_err(|_| LifecycleError::Channel)?
    }

    /// Submit the end-of-day check-in and adapt the plan
    ///
    /// Resolves when the adapt cycle finishes, either way.
    pub async fn submit_check_in(&self, check_in: CheckIn) -> LifecycleResponse<()> {
        debug!(completed = check_in.completed_task_ids.len(), "submit_check_in: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(LifecycleCommand::SubmitCheckIn {
                check_in,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LifecycleError::Channel)?;
        reply_rx.await.map_err(|_| LifecycleError::Channel)?
    }

    /// Current state for rendering; available in every phase
    pub async fn snapshot(&self) -> LifecycleResponse<Snapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(LifecycleCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| LifecycleError::Channel)?;
        reply_rx.await.map_err(|_| LifecycleError::Channel)
    }

    /// Destroy both records and return to onboarding
    pub async fn reset(&self) -> LifecycleResponse<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(LifecycleCommand::Reset { reply: reply_tx })
            .await
            .map_err(|_| LifecycleError::Channel)?;
        reply_rx.await.map_err(|_| LifecycleError::Channel)?
    }

    /// Stop the actor; outstanding commands are dropped
    pub async fn shutdown(&self) {
        let _ = self.tx.send(LifecycleCommand::Shutdown).await;
    }
}

/// What the in-flight oracle call will resolve
enum InFlight {
    Generate { reply: oneshot::Sender<LifecycleResponse<()>> },
    Adapt { reply: oneshot::Sender<LifecycleResponse<()>> },
}

async fn actor_loop(
    mut controller: Controller,
    oracle: Arc<dyn PlanOracle>,
    tx: mpsc::Sender<LifecycleCommand>,
    mut rx: mpsc::Receiver<LifecycleCommand>,
) {
    let mut in_flight: Option<InFlight> = None;

    while let Some(command) = rx.recv().await {
        match command {
            LifecycleCommand::SubmitProfile { profile, reply } => match controller.begin_generate(profile) {
                Ok(profile) => {
                    let request = reconcile::build_generate_request(&profile, today());
                    in_flight = Some(InFlight::Generate { reply });
                    spawn_generate(oracle.clone(), tx.clone(), request);
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },

            LifecycleCommand::SubmitCheckIn { check_in, reply } => match controller.begin_adapt(&check_in) {
                Ok((plan, profile)) => {
                    let request = reconcile::build_adapt_request(&plan, &profile, &check_in, today());
                    in_flight = Some(InFlight::Adapt { reply });
                    spawn_adapt(oracle.clone(), tx.clone(), request);
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },

            LifecycleCommand::OracleDone { outcome } => match in_flight.take() {
                Some(InFlight::Generate { reply }) => {
                    let _ = reply.send(controller.finish_generate(outcome));
                }
                Some(InFlight::Adapt { reply }) => {
                    let _ = reply.send(controller.finish_adapt(outcome));
                }
                None => warn!("OracleDone with nothing in flight, dropping"),
            },

            LifecycleCommand::ToggleTask { task_id, reply } => {
                let _ = reply.send(controller.toggle_task(&task_id));
            }

            LifecycleCommand::Snapshot { reply } => {
                let _ = reply.send(controller.snapshot());
            }

            LifecycleCommand::Reset { reply } => {
                // Not while an oracle call is outstanding; its completion
                // would land on reset state
                let result = if in_flight.is_some() {
                    Err(LifecycleError::OperationInProgress)
                } else {
                    controller.reset()
                };
                let _ = reply.send(result);
            }

            LifecycleCommand::Shutdown => {
                debug!("actor_loop: shutdown");
                break;
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn spawn_generate(oracle: Arc<dyn PlanOracle>, tx: mpsc::Sender<LifecycleCommand>, request: GenerateRequest) {
    tokio::spawn(async move {
        let outcome = run_generate(oracle, request).await;
        let _ = tx.send(LifecycleCommand::OracleDone { outcome }).await;
    });
}

fn spawn_adapt(oracle: Arc<dyn PlanOracle>, tx: mpsc::Sender<LifecycleCommand>, request: AdaptRequest) {
    tokio::spawn(async move {
        let outcome = run_adapt(oracle, request).await;
        let _ = tx.send(LifecycleCommand::OracleDone { outcome }).await;
    });
}

/// Generate path: call the oracle, then validate before anything is trusted
async fn run_generate(oracle: Arc<dyn PlanOracle>, request: GenerateRequest) -> LifecycleResponse<StudyPlan> {
    let raw = oracle
        .generate(&request)
        .await
        .map_err(|e| LifecycleError::OracleUnavailable(e.to_string()))?;
    Ok(reconcile::validate_plan(&raw)?)
}

/// Adapt path: identical shape; the oracle returns a full replacement plan
async fn run_adapt(oracle: Arc<dyn PlanOracle>, request: AdaptRequest) -> LifecycleResponse<StudyPlan> {
    let raw = oracle
        .adapt(&request)
        .await
        .map_err(|e| LifecycleError::OracleUnavailable(e.to_string()))?;
    Ok(reconcile::validate_plan(&raw)?)
}
