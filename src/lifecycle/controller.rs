//! Lifecycle state machine core
//!
//! Owns the authoritative profile/plan pair, the phase, and the transient
//! day-1 completion overlay. All methods are synchronous; the async actor in
//! [`manager`](super::manager) drives the transitions around its oracle
//! calls. The controller is the sole writer of the store.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::messages::LifecycleError;
use crate::domain::{CheckIn, Profile, StudyPlan};
use crate::store::PlanStore;

/// Lifecycle phase
///
/// `Generating` and `Adapting` are the busy states: an oracle call is
/// outstanding, reads stay available, and a second check-in is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No profile/plan
    Onboarding,
    /// Profile set, awaiting the first plan
    Generating,
    /// Profile and plan present; day-1 tasks mutable, check-in submittable
    Ready,
    /// Check-in submitted, awaiting the replacement plan
    Adapting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Onboarding => write!(f, "onboarding"),
            Self::Generating => write!(f, "generating"),
            Self::Ready => write!(f, "ready"),
            Self::Adapting => write!(f, "adapting"),
        }
    }
}

/// Read-only view handed to the presentation layer
///
/// The plan's day-1 `completed` flags have the transient overlay applied, so
/// this is safe to render directly; it is stale-but-consistent while an
/// oracle call is in flight.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub phase: Phase,
    pub profile: Option<Profile>,
    pub plan: Option<StudyPlan>,
}

/// The state machine behind the lifecycle actor
pub struct Controller {
    store: PlanStore,
    phase: Phase,
    profile: Option<Profile>,
    plan: Option<StudyPlan>,
    /// Ids of day-1 tasks whose completion differs from the stored flag.
    /// Never written back to the store; cleared on every successful
    /// adaptation so ids from a retired plan version cannot leak.
    overlay: HashSet<String>,
}

impl Controller {
    /// Restore state from the store
    ///
    /// Both records present and well-formed starts in `Ready`; anything less
    /// starts in `Onboarding` and the partial state is ignored.
    pub fn new(store: PlanStore) -> Self {
        let profile = store.load_profile();
        let plan = store.load_plan();

        let (phase, profile, plan) = match (profile, plan) {
            (Some(profile), Some(plan)) => {
                info!(exam = %profile.exam_name, days = plan.schedule.len(), "Restored profile and plan");
                (Phase::Ready, Some(profile), Some(plan))
            }
            (profile, plan) => {
                if profile.is_some() || plan.is_some() {
                    warn!("Partial state in store, starting onboarding");
                }
                (Phase::Onboarding, None, None)
            }
        };

        Self {
            store,
            phase,
            profile,
            plan,
            overlay: HashSet::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn plan(&self) -> Option<&StudyPlan> {
        self.plan.as_ref()
    }

    /// Accept a profile and enter `Generating`
    ///
    /// Persists the profile before the oracle call so a stored plan can
    /// never exist without its profile. Returns the cleaned profile for
    /// request building.
    pub fn begin_generate(&mut self, mut profile: Profile) -> Result<Profile, LifecycleError> {
        if self.phase != Phase::Onboarding {
            return Err(LifecycleError::InvalidOperation(format!(
                "submit_profile is not valid in phase '{}'",
                self.phase
            )));
        }

        profile.discard_unnamed_subjects();
        profile.complete().map_err(LifecycleError::InvalidProfile)?;

        self.store
            .save_profile(&profile)
            .map_err(|e| LifecycleError::Store(e.to_string()))?;

        self.profile = Some(profile.clone());
        self.phase = Phase::Generating;
        debug!(exam = %profile.exam_name, "begin_generate: entering generating");
        Ok(profile)
    }

    /// Apply the outcome of the first generation
    ///
    /// Success persists the plan and enters `Ready`; failure returns to
    /// `Onboarding` with no plan persisted.
    pub fn finish_generate(&mut self, outcome: Result<StudyPlan, LifecycleError>) -> Result<(), LifecycleError> {
        debug_assert_eq!(self.phase, Phase::Generating);

        match outcome.and_then(|plan| {
            self.store
                .save_plan(&plan)
                .map_err(|e| LifecycleError::Store(e.to_string()))?;
            Ok(plan)
        }) {
            Ok(plan) => {
                info!(days = plan.schedule.len(), "Plan generated");
                self.plan = Some(plan);
                self.overlay.clear();
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Generation failed, returning to onboarding");
                self.phase = Phase::Onboarding;
                Err(e)
            }
        }
    }

    /// Toggle a day-1 task in the transient overlay
    ///
    /// Valid whenever a plan is present, including while `Adapting` (against
    /// the pre-adaptation plan). Toggling anything not on day 1 reports
    /// `InvalidOperation` and changes nothing. Returns the task's effective
    /// completion state after the toggle.
    pub fn toggle_task(&mut self, task_id: &str) -> Result<bool, LifecycleError> {
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| LifecycleError::InvalidOperation("no current plan".to_string()))?;

        let task = plan
            .day1_task(task_id)
            .ok_or_else(|| LifecycleError::InvalidOperation(format!("task '{}' is not on day 1", task_id)))?;

        let stored = task.completed;
        if !self.overlay.remove(task_id) {
            self.overlay.insert(task_id.to_string());
        }
        let effective = stored ^ self.overlay.contains(task_id);
        debug!(%task_id, effective, "toggle_task: toggled");
        Ok(effective)
    }

    /// Effective completed ids for the current day-1 view
    pub fn completed_today(&self) -> Vec<String> {
        let Some(day) = self.plan.as_ref().and_then(|p| p.today()) else {
            return Vec::new();
        };
        day.tasks
            .iter()
            .filter(|t| t.completed ^ self.overlay.contains(&t.id))
            .map(|t| t.id.clone())
            .collect()
    }

    /// Accept a check-in and enter `Adapting`
    ///
    /// Returns the inputs for the adapt request. A check-in while one is
    /// already outstanding is rejected with `OperationInProgress` and leaves
    /// all state unchanged.
    pub fn begin_adapt(&mut self, check_in: &CheckIn) -> Result<(StudyPlan, Profile), LifecycleError> {
        match self.phase {
            Phase::Ready => {}
            Phase::Adapting => return Err(LifecycleError::OperationInProgress),
            phase => {
                return Err(LifecycleError::InvalidOperation(format!(
                    "submit_check_in is not valid in phase '{}'",
                    phase
                )));
            }
        }

        // Both are guaranteed present in Ready
        let (Some(plan), Some(profile)) = (self.plan.clone(), self.profile.clone()) else {
            return Err(LifecycleError::InvalidOperation("no current plan".to_string()));
        };

        self.phase = Phase::Adapting;
        debug!(completed = check_in.completed_task_ids.len(), "begin_adapt: entering adapting");
        Ok((plan, profile))
    }

    /// Apply the outcome of an adaptation
    ///
    /// Success replaces the stored plan wholesale and clears the overlay;
    /// failure leaves the prior plan authoritative. Either way the phase
    /// returns to `Ready`.
    pub fn finish_adapt(&mut self, outcome: Result<StudyPlan, LifecycleError>) -> Result<(), LifecycleError> {
        debug_assert_eq!(self.phase, Phase::Adapting);
        self.phase = Phase::Ready;

        let plan = outcome.inspect_err(|e| {
            warn!(error = %e, "Adaptation failed, prior plan retained");
        })?;

        self.store
            .save_plan(&plan)
            .map_err(|e| LifecycleError::Store(e.to_string()))?;

        info!(days = plan.schedule.len(), "Plan adapted and replaced");
        self.plan = Some(plan);
        self.overlay.clear();
        Ok(())
    }

    /// Explicit reset: destroy both records and return to onboarding
    pub fn reset(&mut self) -> Result<(), LifecycleError> {
        self.store.clear().map_err(|e| LifecycleError::Store(e.to_string()))?;
        self.profile = None;
        self.plan = None;
        self.overlay.clear();
        self.phase = Phase::Onboarding;
        info!("State reset");
        Ok(())
    }

    /// Read-only view with the day-1 overlay applied
    pub fn snapshot(&self) -> Snapshot {
        let plan = self.plan.clone().map(|mut plan| {
            if let Some(day) = plan.schedule.first_mut() {
                for task in &mut day.tasks {
                    task.completed ^= self.overlay.contains(&task.id);
                }
            }
            plan
        });

        Snapshot {
            phase: self.phase,
            profile: self.profile.clone(),
            plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StressLevel, Subject, sample_plan};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn profile() -> Profile {
        Profile {
            name: "Ada".to_string(),
            exam_name: "Calculus Final".to_string(),
            exam_date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            subjects: vec![Subject {
                id: "s1".to_string(),
                name: "Limits".to_string(),
                syllabus: String::new(),
                confidence: 2,
            }],
            daily_hours: 4,
            stress_level: StressLevel::High,
        }
    }

    fn controller(dir: &TempDir) -> Controller {
        Controller::new(PlanStore::open(dir.path()).unwrap())
    }

    fn ready_controller(dir: &TempDir) -> Controller {
        let mut c = controller(dir);
        c.begin_generate(profile()).unwrap();
        c.finish_generate(Ok(sample_plan())).unwrap();
        c
    }

    #[test]
    fn test_starts_onboarding_when_empty() {
        let dir = TempDir::new().unwrap();
        let c = controller(&dir);
        assert_eq!(c.phase(), Phase::Onboarding);
        assert!(c.profile().is_none());
        assert!(c.plan().is_none());
    }

    #[test]
    fn test_starts_ready_when_both_records_present() {
        let dir = TempDir::new().unwrap();
        {
            let store = PlanStore::open(dir.path()).unwrap();
            store.save_profile(&profile()).unwrap();
            store.save_plan(&sample_plan()).unwrap();
        }

        let c = controller(&dir);
        assert_eq!(c.phase(), Phase::Ready);
        assert!(c.plan().is_some());
    }

    #[test]
    fn test_partial_state_starts_onboarding() {
        let dir = TempDir::new().unwrap();
        PlanStore::open(dir.path()).unwrap().save_profile(&profile()).unwrap();

        let c = controller(&dir);
        assert_eq!(c.phase(), Phase::Onboarding);
        assert!(c.profile().is_none());
    }

    #[test]
    fn test_generate_happy_path() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        c.begin_generate(profile()).unwrap();
        assert_eq!(c.phase(), Phase::Generating);

        c.finish_generate(Ok(sample_plan())).unwrap();
        assert_eq!(c.phase(), Phase::Ready);

        // Plan was persisted only after success
        let store = PlanStore::open(dir.path()).unwrap();
        assert_eq!(store.load_plan().unwrap(), sample_plan());
    }

    #[test]
    fn test_generate_rejects_empty_subjects() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        let mut p = profile();
        p.subjects[0].name = String::new();

        let err = c.begin_generate(p).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidProfile(_)));
        assert_eq!(c.phase(), Phase::Onboarding);
    }

    #[test]
    fn test_generate_failure_returns_to_onboarding_without_plan() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        c.begin_generate(profile()).unwrap();
        let err = c
            .finish_generate(Err(LifecycleError::OracleUnavailable("timeout".to_string())))
            .unwrap_err();

        assert!(matches!(err, LifecycleError::OracleUnavailable(_)));
        assert_eq!(c.phase(), Phase::Onboarding);
        assert!(c.plan().is_none());

        // No plan persisted; the profile is retained to avoid re-entry
        let store = PlanStore::open(dir.path()).unwrap();
        assert!(store.load_plan().is_none());
        assert!(store.load_profile().is_some());
    }

    #[test]
    fn test_submit_profile_invalid_outside_onboarding() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);

        let err = c.begin_generate(profile()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidOperation(_)));
        assert_eq!(c.phase(), Phase::Ready);
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);

        assert!(c.toggle_task("t1").unwrap());
        assert_eq!(c.completed_today(), vec!["t1".to_string()]);

        assert!(!c.toggle_task("t1").unwrap());
        assert!(c.completed_today().is_empty());
    }

    #[test]
    fn test_toggle_non_day1_task_is_rejected_and_harmless() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);

        // t3 lives on day 2
        let err = c.toggle_task("t3").unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidOperation(_)));
        assert!(c.completed_today().is_empty());
        assert_eq!(c.phase(), Phase::Ready);
    }

    #[test]
    fn test_toggle_never_persists() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);

        c.toggle_task("t1").unwrap();

        let stored = PlanStore::open(dir.path()).unwrap().load_plan().unwrap();
        assert!(stored.schedule[0].tasks.iter().all(|t| !t.completed));
    }

    #[test]
    fn test_snapshot_overlays_day1_completion() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);

        c.toggle_task("t2").unwrap();
        let snapshot = c.snapshot();
        let day1 = snapshot.plan.as_ref().unwrap().today().unwrap();

        assert!(!day1.tasks[0].completed);
        assert!(day1.tasks[1].completed);
        // The underlying plan is untouched
        assert!(!c.plan().unwrap().schedule[0].tasks[1].completed);
    }

    #[test]
    fn test_adapt_happy_path_replaces_plan_and_clears_overlay() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);
        c.toggle_task("t1").unwrap();

        let check_in = CheckIn {
            completed_task_ids: c.completed_today(),
            current_stress: StressLevel::High,
            notes: "exhausted".to_string(),
        };
        c.begin_adapt(&check_in).unwrap();
        assert_eq!(c.phase(), Phase::Adapting);

        let mut replacement = sample_plan();
        replacement.adaptation_notes = "second cycle".to_string();
        c.finish_adapt(Ok(replacement.clone())).unwrap();

        assert_eq!(c.phase(), Phase::Ready);
        assert_eq!(c.plan().unwrap().adaptation_notes, "second cycle");
        assert!(c.completed_today().is_empty(), "overlay cleared on success");
        assert_eq!(
            PlanStore::open(dir.path()).unwrap().load_plan().unwrap(),
            replacement
        );
    }

    #[test]
    fn test_second_check_in_rejected_while_adapting() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);

        let check_in = CheckIn {
            completed_task_ids: vec![],
            current_stress: StressLevel::Medium,
            notes: String::new(),
        };
        c.begin_adapt(&check_in).unwrap();

        let err = c.begin_adapt(&check_in).unwrap_err();
        assert!(matches!(err, LifecycleError::OperationInProgress));
        assert_eq!(c.phase(), Phase::Adapting);
    }

    #[test]
    fn test_adapt_failure_retains_prior_plan() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);
        c.toggle_task("t1").unwrap();

        let check_in = CheckIn {
            completed_task_ids: vec!["t1".to_string()],
            current_stress: StressLevel::High,
            notes: String::new(),
        };
        c.begin_adapt(&check_in).unwrap();

        let err = c
            .finish_adapt(Err(LifecycleError::OracleUnavailable("503".to_string())))
            .unwrap_err();
        assert!(err.is_cycle_failure());

        assert_eq!(c.phase(), Phase::Ready);
        assert_eq!(c.plan().unwrap(), &sample_plan());
        // Prior plan is still the persisted one, and the overlay survives
        assert_eq!(
            PlanStore::open(dir.path()).unwrap().load_plan().unwrap(),
            sample_plan()
        );
        assert_eq!(c.completed_today(), vec!["t1".to_string()]);
    }

    #[test]
    fn test_toggle_permitted_while_adapting() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);

        let check_in = CheckIn {
            completed_task_ids: vec![],
            current_stress: StressLevel::Low,
            notes: String::new(),
        };
        c.begin_adapt(&check_in).unwrap();

        // Against the pre-adaptation plan's day 1
        assert!(c.toggle_task("t1").unwrap());
    }

    #[test]
    fn test_check_in_invalid_during_onboarding() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        let check_in = CheckIn {
            completed_task_ids: vec![],
            current_stress: StressLevel::Low,
            notes: String::new(),
        };
        let err = c.begin_adapt(&check_in).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidOperation(_)));
    }

    #[test]
    fn test_reset_destroys_everything() {
        let dir = TempDir::new().unwrap();
        let mut c = ready_controller(&dir);

        c.reset().unwrap();
        assert_eq!(c.phase(), Phase::Onboarding);
        assert!(c.plan().is_none());

        let store = PlanStore::open(dir.path()).unwrap();
        assert!(store.load_profile().is_none());
        assert!(store.load_plan().is_none());
    }
}
