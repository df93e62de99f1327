//! The deterministic strategy: the core rule cascade behind the
//! [`Classify`] seam.

use async_trait::async_trait;

use gridpilot_core::classify;
use gridpilot_core::op::{ClassifyResponse, DocumentContext};

use super::{Classify, ClassifyError};

#[derive(Clone, Copy, Debug, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        RuleClassifier
    }
}

#[async_trait]
impl Classify for RuleClassifier {
    async fn classify(
        &self,
        prompt: &str,
        context: &DocumentContext,
    ) -> Result<ClassifyResponse, ClassifyError> {
        Ok(classify::classify(prompt, context))
    }
}
