//! Scripted oracle for tests
//!
//! Returns queued responses in order and records every request it receives,
//! so tests can assert on exactly what the controller sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{OracleError, PlanOracle};
use crate::reconcile::{AdaptRequest, GenerateRequest};

/// A recorded oracle invocation
#[derive(Debug, Clone)]
pub enum OracleCall {
    Generate(GenerateRequest),
    Adapt(AdaptRequest),
}

impl OracleCall {
    /// Completed task ids if this was an adapt call
    pub fn adapt_completed_ids(&self) -> Option<&[String]> {
        match self {
            Self::Adapt(req) => Some(&req.check_in.completed_task_ids),
            Self::Generate(_) => None,
        }
    }
}

/// Deterministic in-memory oracle
#[derive(Default)]
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<Result<Value, OracleError>>>,
    calls: Mutex<Vec<OracleCall>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful raw response
    pub fn push_ok(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    /// Queue a failure
    pub fn push_err(&self, error: OracleError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Every request received so far, in order
    pub fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<Value, OracleError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Config("scripted oracle ran out of responses".to_string())))
    }
}

#[async_trait]
impl PlanOracle for ScriptedOracle {
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, OracleError> {
        self.calls.lock().unwrap().push(OracleCall::Generate(request.clone()));
        self.next_response()
    }

    async fn adapt(&self, request: &AdaptRequest) -> Result<Value, OracleError> {
        self.calls.lock().unwrap().push(OracleCall::Adapt(request.clone()));
        self.next_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CheckIn, Profile, StressLevel, Subject};
    use crate::reconcile::{build_adapt_request, build_generate_request};
    use chrono::NaiveDate;
    use serde_json::json;

    fn profile() -> Profile {
        Profile {
            name: String::new(),
            exam_name: "Exam".to_string(),
            exam_date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            subjects: vec![Subject {
                id: "s1".to_string(),
                name: "Limits".to_string(),
                syllabus: String::new(),
                confidence: 2,
            }],
            daily_hours: 4,
            stress_level: StressLevel::Medium,
        }
    }

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let oracle = ScriptedOracle::new();
        oracle.push_ok(json!({"first": true}));
        oracle.push_err(OracleError::Api {
            status: 503,
            message: "down".to_string(),
        });

        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let req = build_generate_request(&profile(), today);

        assert!(oracle.generate(&req).await.is_ok());
        assert!(oracle.generate(&req).await.is_err());
        // Exhausted script also fails rather than panicking
        assert!(oracle.generate(&req).await.is_err());
        assert_eq!(oracle.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_records_adapt_check_in_ids() {
        let oracle = ScriptedOracle::new();
        oracle.push_ok(json!({}));

        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let plan = crate::domain::sample_plan();
        let check_in = CheckIn {
            completed_task_ids: vec!["t1".to_string(), "t2".to_string()],
            current_stress: StressLevel::High,
            notes: String::new(),
        };
        let req = build_adapt_request(&plan, &profile(), &check_in, today);

        oracle.adapt(&req).await.unwrap();

        let calls = oracle.calls();
        assert_eq!(
            calls[0].adapt_completed_ids().unwrap(),
            &["t1".to_string(), "t2".to_string()]
        );
    }
}
