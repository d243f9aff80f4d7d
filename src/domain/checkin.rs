//! Check-in domain type
//!
//! The end-of-day report that closes out day 1 and triggers adaptation.

use serde::{Deserialize, Serialize};

use super::StressLevel;

/// End-of-day report submitted against the plan being closed out
///
/// Completed ids refer to day-1 tasks of the *current* plan version; they are
/// meaningless against the replacement plan the adaptation returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    /// Ids of day-1 tasks the user completed
    pub completed_task_ids: Vec<String>,

    /// Stress level right now, not the onboarding value
    pub current_stress: StressLevel,

    /// Free-text notes for the oracle
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_serde() {
        let check_in = CheckIn {
            completed_task_ids: vec!["t1".to_string(), "t2".to_string()],
            current_stress: StressLevel::High,
            notes: "exhausted".to_string(),
        };

        let json = serde_json::to_value(&check_in).unwrap();
        assert!(json.get("completedTaskIds").is_some());
        assert_eq!(json["currentStress"], "high");

        let back: CheckIn = serde_json::from_value(json).unwrap();
        assert_eq!(back, check_in);
    }
}
