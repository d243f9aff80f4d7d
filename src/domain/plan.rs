//! Study plan domain types
//!
//! A StudyPlan is the durable, wholly-replaced schedule plus strategic
//! guidance for the remaining days. Day 1 of the schedule is "today", the
//! only actionable day. Task ids are scoped to a single plan version; an
//! adapted plan may reuse or redefine them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task type, closed enum on the oracle wire contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Study,
    Review,
    Practice,
    Break,
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Study => write!(f, "study"),
            Self::Review => write!(f, "review"),
            Self::Practice => write!(f, "practice"),
            Self::Break => write!(f, "break"),
        }
    }
}

/// Effort level, closed enum on the oracle wire contract
///
/// Serialized capitalized (`Low`/`Medium`/`High`), unlike [`StressLevel`].
///
/// [`StressLevel`]: super::StressLevel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Effort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A single scheduled task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within one plan version only
    pub id: String,

    pub title: String,

    #[serde(rename = "type")]
    pub task_type: TaskType,

    pub effort: Effort,

    /// Free-text duration, e.g. "45 min"
    pub duration: String,

    /// Durable completion flag as last written by an adaptation; the live
    /// day-1 view layers the controller's transient overlay on top
    #[serde(default)]
    pub completed: bool,
}

/// One day of the schedule; task order is significant (a break interleaved
/// among study tasks signals pacing intent)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    /// 1-based, increasing across the schedule
    pub day_number: u32,

    pub date: NaiveDate,

    pub tasks: Vec<Task>,

    /// End-of-day checkpoint narrative
    #[serde(default)]
    pub checkpoint: String,

    /// Stress-coping tip for the day
    #[serde(default)]
    pub stress_tip: String,
}

/// A topic with the oracle's reasoning for its placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNote {
    pub topic: String,
    #[serde(default)]
    pub reason: String,
}

/// Strategic guidance attached to every plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicOverview {
    /// Ordered priority topics
    #[serde(default)]
    pub priorities: Vec<String>,

    /// Topics to learn deeply
    #[serde(default)]
    pub master: Vec<TopicNote>,

    /// Explicitly deprioritized material
    #[serde(default)]
    pub skip: Vec<TopicNote>,

    /// Pacing-philosophy narrative
    #[serde(default)]
    pub pacing_philosophy: String,
}

/// The authoritative plan: strategy, schedule, and the adaptation notes the
/// oracle carries forward between cycles for continuity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub strategy: StrategicOverview,

    pub schedule: Vec<DayPlan>,

    pub adaptation_notes: String,
}

impl StudyPlan {
    /// The day-1 DayPlan, "today", the only mutable day
    pub fn today(&self) -> Option<&DayPlan> {
        self.schedule.first()
    }

    /// Whether a task id belongs to day 1
    pub fn is_day1_task(&self, task_id: &str) -> bool {
        self.today()
            .map(|d| d.tasks.iter().any(|t| t.id == task_id))
            .unwrap_or(false)
    }

    /// Look up a day-1 task by id
    pub fn day1_task(&self, task_id: &str) -> Option<&Task> {
        self.today().and_then(|d| d.tasks.iter().find(|t| t.id == task_id))
    }
}

/// Two-day fixture plan shared across unit tests
#[cfg(test)]
pub(crate) fn sample_plan() -> StudyPlan {
    StudyPlan {
        strategy: StrategicOverview {
            priorities: vec!["Limits".to_string()],
            master: vec![TopicNote {
                topic: "Limits".to_string(),
                reason: "low confidence, high yield".to_string(),
            }],
            skip: vec![],
            pacing_philosophy: "short blocks, frequent recovery".to_string(),
        },
        schedule: vec![
            DayPlan {
                day_number: 1,
                date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
                tasks: vec![
                    Task {
                        id: "t1".to_string(),
                        title: "Epsilon-delta basics".to_string(),
                        task_type: TaskType::Study,
                        effort: Effort::High,
                        duration: "45 min".to_string(),
                        completed: false,
                    },
                    Task {
                        id: "t2".to_string(),
                        title: "Walk".to_string(),
                        task_type: TaskType::Break,
                        effort: Effort::Low,
                        duration: "15 min".to_string(),
                        completed: false,
                    },
                ],
                checkpoint: "can state the limit definition".to_string(),
                stress_tip: "breathe".to_string(),
            },
            DayPlan {
                day_number: 2,
                date: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
                tasks: vec![Task {
                    id: "t3".to_string(),
                    title: "Limit laws practice set".to_string(),
                    task_type: TaskType::Practice,
                    effort: Effort::Medium,
                    duration: "60 min".to_string(),
                    completed: false,
                }],
                checkpoint: String::new(),
                stress_tip: String::new(),
            },
        ],
        adaptation_notes: "initial plan".to_string(),
    }
}
