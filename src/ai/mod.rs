//! Classification strategies.
//!
//! [`Classify`] is the seam between the orchestrator and whichever strategy
//! configuration selected: [`RuleClassifier`] when no credential is present,
//! [`LlmClassifier`] otherwise (which itself falls back to the rules when
//! the external service misbehaves).

use async_trait::async_trait;
use thiserror::Error;

use gridpilot_core::op::{ClassifyResponse, DocumentContext};

mod llm;
mod rules;

pub use llm::{LlmClassifier, LlmClient, LlmClientConfig, LlmError};
pub use rules::RuleClassifier;

/// A transport-level classification fault.
///
/// Production classifiers absorb their own failures (fallback or a `Failure`
/// response) and never return this; the orchestrator retries it when a
/// custom implementation does.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("classification failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(
        &self,
        prompt: &str,
        context: &DocumentContext,
    ) -> Result<ClassifyResponse, ClassifyError>;
}

#[async_trait]
impl Classify for Box<dyn Classify> {
    async fn classify(
        &self,
        prompt: &str,
        context: &DocumentContext,
    ) -> Result<ClassifyResponse, ClassifyError> {
        (**self).classify(prompt, context).await
    }
}
