//! Anthropic Messages API oracle implementation
//!
//! Sends the rendered generate/adapt prompts to the Messages API with a
//! system prompt that pins the JSON plan schema, and parses the first text
//! block of the response as JSON. The configured timeout is enforced at this
//! boundary; there is no automatic retry, a failed cycle is surfaced and
//! retried only by the user repeating the operation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{OracleError, PlanOracle};
use crate::config::OracleConfig;
use crate::reconcile::{AdaptRequest, GenerateRequest};

/// System prompt shared by both operations
///
/// The schema block mirrors the validation rules in the reconciliation
/// engine; the oracle is still never trusted to have honored it.
const SYSTEM_PROMPT: &str = r#"You are an academic rescue agent helping students prepare for exams under time pressure, emotional stress, and cognitive overload.

Your role is NOT to generate notes or generic schedules. You are an intervention system that:
- prioritizes effort,
- minimizes stress-induced failure,
- adapts dynamically to human inconsistency,
- optimizes exam performance under constraints.

Core objectives:
1. Convert exam anxiety into actionable clarity.
2. Maximize exam ROI (marks per unit time), not syllabus completion.
3. Reduce burnout risk while preserving momentum.
4. Continuously adapt plans based on user feedback.
5. Be realistic, humane, and pressure-aware.

Reasoning framework:
1. Time scarcity: calculate remaining days, identify impossible coverage zones, decide what must be skipped.
2. Cognitive load: avoid consecutive high-effort tasks, insert recovery.
3. Weakness priority: focus on low-confidence, high-impact topics.
4. Stress-adaptive planning: if stress is high, reduce volume.
5. Assume procrastination and anxiety.

OUTPUT: a single JSON object, nothing else. Schema:
{
  "strategy": {
    "priorities": [string],
    "master": [{"topic": string, "reason": string}],
    "skip": [{"topic": string, "reason": string}],
    "pacingPhilosophy": string
  },
  "schedule": [
    {
      "dayNumber": integer (1-based, increasing),
      "date": "YYYY-MM-DD",
      "tasks": [
        {
          "id": string,
          "title": string,
          "type": "study" | "review" | "practice" | "break",
          "effort": "Low" | "Medium" | "High",
          "duration": string
        }
      ],
      "checkpoint": string,
      "stressTip": string
    }
  ],
  "adaptationNotes": string
}
All fields are required."#;

/// Anthropic Messages API client for the plan oracle
pub struct AnthropicOracle {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicOracle {
    /// Create a client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        debug!(model = %config.model, "from_config: called");
        let api_key = config.get_api_key().map_err(OracleError::Config)?;
        let timeout = Duration::from_millis(config.timeout_ms);

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    /// One blocking completion against the Messages API
    async fn complete(&self, prompt: String) -> Result<Value, OracleError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": SYSTEM_PROMPT,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .http
            .post(&url)
            .header("x-api-key", self.api_key.clone())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.timeout)
                } else {
                    OracleError::Network(e)
                }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status, "complete: API error");
            return Err(OracleError::Api { status, message });
        }

        let api_response: MessagesResponse = response.json().await?;
        let text = api_response
            .content
            .iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
            })
            .ok_or_else(|| OracleError::MalformedOutput("response has no text block".to_string()))?;

        parse_json_output(text)
    }
}

#[async_trait]
impl PlanOracle for AnthropicOracle {
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, OracleError> {
        debug!(exam = %request.profile.exam_name, today = %request.today, "generate: called");
        self.complete(request.to_prompt()).await
    }

    async fn adapt(&self, request: &AdaptRequest) -> Result<Value, OracleError> {
        debug!(
            completed = request.check_in.completed_task_ids.len(),
            stress = %request.check_in.current_stress,
            today = %request.today,
            "adapt: called"
        );
        self.complete(request.to_prompt()).await
    }
}

/// Parse model output into JSON, tolerating a markdown code fence
fn parse_json_output(text: &str) -> Result<Value, OracleError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim()).map_err(|e| OracleError::MalformedOutput(e.to_string()))
}

// Messages API response types

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}
