//! Reconciliation engine
//!
//! Shapes outbound oracle requests and validates inbound responses. Holds no
//! state: request builders are pure functions over the profile, plan, and
//! check-in, and [`validate_plan`] normalizes a raw response into the
//! canonical plan shape or rejects it.

mod validate;

use chrono::NaiveDate;

use crate::domain::{CheckIn, Profile, StrategicOverview, StudyPlan};

pub use validate::{ValidationError, validate_plan};

/// Inputs for the initial plan generation
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub profile: Profile,
    /// Anchors day 1 of the returned schedule
    pub today: NaiveDate,
}

/// Inputs for a check-in adaptation
///
/// Carries the prior strategy and adaptation notes so the oracle has
/// continuity; the replacement schedule must restart at the day after
/// `today`.
#[derive(Debug, Clone)]
pub struct AdaptRequest {
    pub profile: Profile,
    pub check_in: CheckIn,
    pub prior_strategy: StrategicOverview,
    pub prior_notes: String,
    pub today: NaiveDate,
}

/// Build the generate request from a complete profile
pub fn build_generate_request(profile: &Profile, today: NaiveDate) -> GenerateRequest {
    GenerateRequest {
        profile: profile.clone(),
        today,
    }
}

/// Build the adapt request from the plan being closed out
pub fn build_adapt_request(
    plan: &StudyPlan,
    profile: &Profile,
    check_in: &CheckIn,
    today: NaiveDate,
) -> AdaptRequest {
    AdaptRequest {
        profile: profile.clone(),
        check_in: check_in.clone(),
        prior_strategy: plan.strategy.clone(),
        prior_notes: plan.adaptation_notes.clone(),
        today,
    }
}

impl GenerateRequest {
    /// Render the natural-language prompt the oracle receives
    pub fn to_prompt(&self) -> String {
        let subjects = serde_json::to_string(&self.profile.subjects).unwrap_or_else(|_| "[]".to_string());

        format!(
            "Create a rescue study plan for:\n\
             Exam: {exam}\n\
             Exam date: {exam_date}\n\
             Days remaining: {days}\n\
             Daily hours available: {hours}\n\
             Current stress: {stress}\n\
             \n\
             Subjects (with 1-5 confidence):\n{subjects}\n\
             \n\
             Today is {today}. Day 1 of the schedule must be dated {today}.\n\
             \n\
             Remember:\n\
             - If stress is high, reduce the daily load significantly.\n\
             - If confidence in a subject is low, prioritize high-yield basics.\n\
             - Do NOT fill every hour. Leave buffer.",
            exam = self.profile.exam_name,
            exam_date = self.profile.exam_date,
            days = self.profile.days_until_exam(self.today),
            hours = self.profile.daily_hours,
            stress = self.profile.stress_level,
            subjects = subjects,
            today = self.today,
        )
    }
}

impl AdaptRequest {
    /// Render the natural-language prompt the oracle receives
    pub fn to_prompt(&self) -> String {
        let strategy = serde_json::to_string(&self.prior_strategy).unwrap_or_else(|_| "{}".to_string());

        format!(
            "ADAPTATION REQUIRED.\n\
             Current context:\n\
             - Reported stress: {stress}\n\
             - Feedback notes: {notes}\n\
             - Completed task ids from the closed-out day: {completed}\n\
             - Exam: {exam} on {exam_date}\n\
             - Daily hours available: {hours}\n\
             \n\
             Prior strategy:\n{strategy}\n\
             \n\
             Prior adaptation notes:\n{prior_notes}\n\
             \n\
             Instructions:\n\
             1. If tasks were missed, decide whether to drop or condense them; \
             do not blindly push them to tomorrow.\n\
             2. If stress increased, reduce the difficulty of the next 2 days.\n\
             3. Regenerate the schedule starting from TOMORROW: day 1 must be \
             dated {tomorrow}.\n\
             \n\
             Today is {today}.",
            stress = self.check_in.current_stress,
            notes = self.check_in.notes,
            completed = self.check_in.completed_task_ids.join(", "),
            exam = self.profile.exam_name,
            exam_date = self.profile.exam_date,
            hours = self.profile.daily_hours,
            strategy = strategy,
            prior_notes = self.prior_notes,
            tomorrow = self.today.succ_opt().unwrap_or(self.today),
            today = self.today,
        )
    }
}
