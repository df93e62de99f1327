//! External text-generation strategy.
//!
//! Sends the prompt plus serialized document context to an OpenAI-style chat
//! completions endpoint and parses the completion as a classification
//! payload. The payload crosses the schema-validation trust boundary before
//! anything downstream sees it; on any failure along the way (HTTP, JSON,
//! schema) the rule cascade answers instead and the raw failure is only
//! logged, never surfaced.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use gridpilot_core::op::{ClassifyResponse, DocumentContext};
use gridpilot_core::validate;

use super::rules::RuleClassifier;
use super::{Classify, ClassifyError};

const SYSTEM_PROMPT: &str = "You are an expert spreadsheet assistant. Given a user prompt and \
context, return a JSON object with the following structure: { action: \
(explain|create|modify|format|analyze|transform|clean), description: string, operations: [{ \
type: (formula|format|insert|delete|modify|copy|move|sort|filter|chart|table|clean), target: \
string, value?: string, range?: string, options?: object, description: string }], suggestions: \
string[] }. Only return valid JSON.";

/// Client configuration for the chat completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// Bearer credential.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Base endpoint URL.
    pub endpoint: String,
    /// Temperature for generation.
    pub temperature: f32,
    /// Completion length limit.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            temperature: 0.2,
            max_tokens: 512,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
}

// Chat completions request/response structures

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Thin HTTP client for the completions endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmClientConfig,
}

impl LlmClient {
    pub fn new(config: LlmClientConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// One completion round-trip; returns the raw completion text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .map_err(|e| LlmError::Http(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.endpoint))
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http(format!("{}: {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Response("completion had no choices".to_string()))
    }
}

/// The external strategy with silent rule-based fallback.
pub struct LlmClassifier {
    client: LlmClient,
    fallback: RuleClassifier,
}

impl LlmClassifier {
    pub fn new(config: LlmClientConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: LlmClient::new(config)?,
            fallback: RuleClassifier::new(),
        })
    }

    fn build_user_message(prompt: &str, context: &DocumentContext) -> String {
        let context_json = serde_json::to_string(context).unwrap_or_else(|_| "{}".to_string());
        format!("Prompt: {}\nContext: {}", prompt, context_json)
    }
}

#[async_trait]
impl Classify for LlmClassifier {
    async fn classify(
        &self,
        prompt: &str,
        context: &DocumentContext,
    ) -> Result<ClassifyResponse, ClassifyError> {
        if prompt.trim().is_empty() {
            return Ok(ClassifyResponse::failure(
                "prompt must be a non-empty string",
            ));
        }

        let user = Self::build_user_message(prompt, context);
        let content = match self.client.complete(SYSTEM_PROMPT, &user).await {
            Ok(content) => content,
            Err(err) => {
                warn!(error = %err, "text service call failed, using rule fallback");
                return self.fallback.classify(prompt, context).await;
            }
        };

        let value: Value = match serde_json::from_str(content.trim()) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "completion was not valid JSON, using rule fallback");
                return self.fallback.classify(prompt, context).await;
            }
        };
        // Some models wrap the payload in a full response envelope.
        let payload = value.get("data").unwrap_or(&value);

        match validate::decode_payload(payload) {
            Ok(classification) => {
                debug!(
                    action = %classification.action,
                    operations = classification.operations.len(),
                    "text service classification accepted"
                );
                Ok(ClassifyResponse::success(classification))
            }
            Err(err) => {
                warn!(error = %err, "completion failed schema validation, using rule fallback");
                self.fallback.classify(prompt, context).await
            }
        }
    }
}
