//! Profile domain types
//!
//! A Profile is captured once during onboarding and is read-only input to
//! every subsequent oracle call for the lifetime of a plan cycle.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Self-reported stress level, also used in check-ins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for StressLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown stress level: '{}'", other)),
        }
    }
}

/// One subject the student is preparing, with a 1-5 confidence score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Unique within the profile
    pub id: String,

    /// Subject name; subjects with an empty name are discarded
    pub name: String,

    /// Free-text syllabus notes
    #[serde(default)]
    pub syllabus: String,

    /// Confidence score, 1 (lost) to 5 (solid)
    pub confidence: u8,
}

/// The durable description of the student, exam, and subjects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Student name (display only)
    #[serde(default)]
    pub name: String,

    /// Exam name, e.g. "Calculus Final"
    pub exam_name: String,

    /// Calendar date of the exam
    pub exam_date: NaiveDate,

    /// Ordered subjects; order reflects user priority
    pub subjects: Vec<Subject>,

    /// Hours available per day, positive
    pub daily_hours: u32,

    /// Stress level reported at onboarding
    pub stress_level: StressLevel,
}

impl Profile {
    /// Drop subjects with empty names
    ///
    /// Applied before the profile is considered complete; the remaining
    /// subject order is preserved.
    pub fn discard_unnamed_subjects(&mut self) {
        self.subjects.retain(|s| !s.name.trim().is_empty());
    }

    /// Check the constraints the controller enforces before generation
    ///
    /// The presentation layer pre-validates the rest (future exam date etc.);
    /// the controller still rejects an empty subject list or exam name.
    pub fn complete(&self) -> Result<(), String> {
        if self.exam_name.trim().is_empty() {
            return Err("exam name is empty".to_string());
        }
        if self.subjects.iter().all(|s| s.name.trim().is_empty()) {
            return Err("profile has no named subjects".to_string());
        }
        if self.daily_hours == 0 {
            return Err("daily hours must be positive".to_string());
        }
        Ok(())
    }

    /// Days remaining until the exam, negative if it has passed
    pub fn days_until_exam(&self, today: NaiveDate) -> i64 {
        (self.exam_date - today).num_days()
    }
}
