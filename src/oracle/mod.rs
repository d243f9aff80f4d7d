//! Plan oracle client
//!
//! The request/response boundary to the external plan-generation service.
//! Two operations, both async and fallible, both idempotent from the caller's
//! side (no side effects beyond the returned value) though the output itself
//! is not deterministic. Implementations return the oracle's *raw* JSON; the
//! reconciliation engine decides whether it is a usable plan.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

mod anthropic;
mod error;
mod scripted;

pub use anthropic::AnthropicOracle;
pub use error::OracleError;
pub use scripted::{OracleCall, ScriptedOracle};

use crate::config::OracleConfig;
use crate::reconcile::{AdaptRequest, GenerateRequest};

/// Capability interface to the plan-generation service
///
/// Injected into the lifecycle controller so tests can substitute a
/// deterministic stub.
#[async_trait]
pub trait PlanOracle: Send + Sync {
    /// Produce an initial plan for a complete profile
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, OracleError>;

    /// Produce a replacement plan from a check-in
    async fn adapt(&self, request: &AdaptRequest) -> Result<Value, OracleError>;
}

/// Create an oracle client based on the provider specified in config
///
/// Currently only "anthropic" is supported.
pub fn create_oracle(config: &OracleConfig) -> Result<Arc<dyn PlanOracle>, OracleError> {
    debug!(provider = %config.provider, model = %config.model, "create_oracle: called");
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicOracle::from_config(config)?)),
        other => Err(OracleError::Config(format!(
            "Unknown oracle provider: '{}'. Supported: anthropic",
            other
        ))),
    }
}
