//! Oracle response validation
//!
//! The oracle is told to return strictly structured JSON, but it is never
//! trusted: every response passes through [`validate_plan`] before it can
//! become the authoritative plan. A failure here is reported to the
//! controller identically to a transport failure: the cycle failed and prior
//! state is retained.

use serde_json::Value;
use thiserror::Error;

use crate::domain::StudyPlan;

/// Why a raw oracle response was rejected
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Response is not a JSON object")]
    NotAnObject,

    #[error("Response missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Day {index} missing required field '{field}'")]
    MalformedDay { index: usize, field: &'static str },

    #[error("Day {0} is not a JSON object")]
    DayNotAnObject(usize),

    #[error("Schedule is empty")]
    EmptySchedule,

    #[error("Day numbers must start at 1 and strictly increase (day {index} has number {number})")]
    BadDayNumber { index: usize, number: i64 },

    #[error("Task {index} on day {day} has an empty '{field}'")]
    EmptyTaskField {
        day: u32,
        index: usize,
        field: &'static str,
    },

    #[error("Response does not match the plan schema: {0}")]
    Schema(String),
}

/// Validate and normalize a raw oracle response into a [`StudyPlan`]
///
/// Checks the required top-level and per-day fields by hand so rejections
/// name the offending field, then lets serde enforce the closed task
/// type/effort enums and field types.
pub fn validate_plan(raw: &Value) -> Result<StudyPlan, ValidationError> {
    let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    for field in ["strategy", "schedule", "adaptationNotes"] {
        if !obj.contains_key(field) {
            return Err(ValidationError::MissingField(field));
        }
    }

    let schedule = obj["schedule"]
        .as_array()
        .ok_or(ValidationError::MissingField("schedule"))?;
    if schedule.is_empty() {
        return Err(ValidationError::EmptySchedule);
    }

    for (index, day) in schedule.iter().enumerate() {
        let day_obj = day.as_object().ok_or(ValidationError::DayNotAnObject(index))?;
        for field in ["dayNumber", "date", "tasks"] {
            if !day_obj.contains_key(field) {
                return Err(ValidationError::MalformedDay { index, field });
            }
        }
    }

    let plan: StudyPlan =
        serde_json::from_value(raw.clone()).map_err(|e| ValidationError::Schema(e.to_string()))?;

    // Day numbers: the schedule starts at 1 ("today"), then strictly
    // increases. Gaps after day 1 are allowed; the oracle may compress rest
    // days away.
    let mut prev: i64 = 0;
    for (index, day) in plan.schedule.iter().enumerate() {
        let number = day.day_number as i64;
        if (index == 0 && number != 1) || number <= prev {
            return Err(ValidationError::BadDayNumber { index, number });
        }
        prev = number;
    }

    // Every task needs a usable id, title, and duration; ids are only
    // required to be unique within this plan version.
    for day in &plan.schedule {
        for (index, task) in day.tasks.iter().enumerate() {
            let field = if task.id.trim().is_empty() {
                Some("id")
            } else if task.title.trim().is_empty() {
                Some("title")
            } else if task.duration.trim().is_empty() {
                Some("duration")
            } else {
                None
            };
            if let Some(field) = field {
                return Err(ValidationError::EmptyTaskField {
                    day: day.day_number,
                    index,
                    field,
                });
            }
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_response() -> Value {
        json!({
            "strategy": {
                "priorities": ["Limits"],
                "master": [{"topic": "Limits", "reason": "high yield"}],
                "skip": [{"topic": "History of calculus", "reason": "zero marks"}],
                "pacingPhilosophy": "steady"
            },
            "schedule": [
                {
                    "dayNumber": 1,
                    "date": "2026-08-30",
                    "tasks": [
                        {"id": "t1", "title": "Limits intro", "type": "study",
                         "effort": "High", "duration": "45 min"},
                        {"id": "t2", "title": "Walk", "type": "break",
                         "effort": "Low", "duration": "15 min"}
                    ],
                    "checkpoint": "definition memorized",
                    "stressTip": "breathe"
                },
                {
                    "dayNumber": 2,
                    "date": "2026-08-31",
                    "tasks": [
                        {"id": "t3", "title": "Practice set", "type": "practice",
                         "effort": "Medium", "duration": "60 min"}
                    ],
                    "checkpoint": "",
                    "stressTip": ""
                }
            ],
            "adaptationNotes": "initial plan"
        })
    }

    #[test]
    fn test_accepts_valid_response() {
        let plan = validate_plan(&valid_response()).unwrap();
        assert_eq!(plan.schedule.len(), 2);
        assert_eq!(plan.today().unwrap().tasks.len(), 2);
        assert!(!plan.schedule[0].tasks[0].completed);
    }

    #[test]
    fn test_rejects_missing_adaptation_notes() {
        let mut raw = valid_response();
        raw.as_object_mut().unwrap().remove("adaptationNotes");

        let err = validate_plan(&raw).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("adaptationNotes")));
    }

    #[test]
    fn test_rejects_missing_strategy() {
        let mut raw = valid_response();
        raw.as_object_mut().unwrap().remove("strategy");
        assert!(matches!(
            validate_plan(&raw).unwrap_err(),
            ValidationError::MissingField("strategy")
        ));
    }

    #[test]
    fn test_rejects_task_type_outside_enum() {
        let mut raw = valid_response();
        raw["schedule"][0]["tasks"][0]["type"] = json!("quiz");

        let err = validate_plan(&raw).unwrap_err();
        assert!(matches!(err, ValidationError::Schema(_)));
    }

    #[test]
    fn test_rejects_effort_outside_enum() {
        let mut raw = valid_response();
        raw["schedule"][0]["tasks"][0]["effort"] = json!("extreme");
        assert!(matches!(validate_plan(&raw).unwrap_err(), ValidationError::Schema(_)));
    }

    #[test]
    fn test_rejects_day_missing_tasks() {
        let mut raw = valid_response();
        raw["schedule"][1].as_object_mut().unwrap().remove("tasks");

        let err = validate_plan(&raw).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedDay { index: 1, field: "tasks" }));
    }

    #[test]
    fn test_rejects_day_missing_date() {
        let mut raw = valid_response();
        raw["schedule"][0].as_object_mut().unwrap().remove("date");
        assert!(matches!(
            validate_plan(&raw).unwrap_err(),
            ValidationError::MalformedDay { index: 0, field: "date" }
        ));
    }

    #[test]
    fn test_rejects_empty_schedule() {
        let mut raw = valid_response();
        raw["schedule"] = json!([]);
        assert!(matches!(validate_plan(&raw).unwrap_err(), ValidationError::EmptySchedule));
    }

    #[test]
    fn test_rejects_duplicate_day_numbers() {
        let mut raw = valid_response();
        raw["schedule"][1]["dayNumber"] = json!(1);
        assert!(matches!(
            validate_plan(&raw).unwrap_err(),
            ValidationError::BadDayNumber { index: 1, number: 1 }
        ));
    }

    #[test]
    fn test_rejects_zero_day_number() {
        let mut raw = valid_response();
        raw["schedule"][0]["dayNumber"] = json!(0);
        assert!(matches!(
            validate_plan(&raw).unwrap_err(),
            ValidationError::BadDayNumber { index: 0, number: 0 }
        ));
    }

    #[test]
    fn test_rejects_schedule_not_starting_at_day_one() {
        // Day 1 is "today"; a schedule whose first entry is a later day
        // number has no current day to track
        let mut raw = valid_response();
        raw["schedule"][0]["dayNumber"] = json!(5);
        raw["schedule"][1]["dayNumber"] = json!(6);
        assert!(matches!(
            validate_plan(&raw).unwrap_err(),
            ValidationError::BadDayNumber { index: 0, number: 5 }
        ));

        // A single-day schedule is held to the same rule
        let mut raw = valid_response();
        raw["schedule"].as_array_mut().unwrap().truncate(1);
        raw["schedule"][0]["dayNumber"] = json!(5);
        assert!(matches!(
            validate_plan(&raw).unwrap_err(),
            ValidationError::BadDayNumber { index: 0, number: 5 }
        ));
    }

    #[test]
    fn test_rejects_day_that_is_not_an_object() {
        let mut raw = valid_response();
        raw["schedule"][1] = json!("day two");
        assert!(matches!(
            validate_plan(&raw).unwrap_err(),
            ValidationError::DayNotAnObject(1)
        ));
    }

    #[test]
    fn test_rejects_empty_task_id() {
        let mut raw = valid_response();
        raw["schedule"][0]["tasks"][0]["id"] = json!("  ");

        let err = validate_plan(&raw).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyTaskField { day: 1, index: 0, field: "id" }));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            validate_plan(&json!(["not", "a", "plan"])).unwrap_err(),
            ValidationError::NotAnObject
        ));
    }

    #[test]
    fn test_allows_day_number_gaps() {
        let mut raw = valid_response();
        raw["schedule"][1]["dayNumber"] = json!(4);
        assert!(validate_plan(&raw).is_ok());
    }
}
