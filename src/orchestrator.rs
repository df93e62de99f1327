//! The request orchestrator: single-flight prompt submission with retry,
//! backoff, and cooperative cancellation.
//!
//! A new `send_prompt` cancels any in-flight request first — the latest
//! prompt always wins, and a superseded request's eventual result is never
//! adopted. Each request owns its own [`CancelToken`], so the
//! cancel-then-restart sequence has an unambiguous ownership boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};

use gridpilot_core::executor;
use gridpilot_core::op::{Classification, ClassifyResponse, OperationResult};
use gridpilot_core::SheetHost;

use crate::ai::Classify;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Shared cancellation flag, checked at the defined suspension points.
/// Cancellation never preempts an issued document call; it only prevents the
/// result from being adopted and stops further retries.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Orchestrator<C, H> {
    classifier: C,
    host: tokio::sync::Mutex<H>,
    max_retries: u32,
    retry_delay: Duration,
    inflight: Mutex<Option<CancelToken>>,
    last_response: Mutex<Option<ClassifyResponse>>,
    pending: Mutex<Option<Classification>>,
}

impl<C, H> Orchestrator<C, H>
where
    C: Classify,
    H: SheetHost,
{
    pub fn new(classifier: C, host: H) -> Self {
        Self {
            classifier,
            host: tokio::sync::Mutex::new(host),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            inflight: Mutex::new(None),
            last_response: Mutex::new(None),
            pending: Mutex::new(None),
        }
    }

    pub fn with_retry(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Submit a prompt, superseding any in-flight request.
    ///
    /// Retries transport-level failures up to `max_retries` times with a
    /// linear-growth backoff (`retry_delay * attempt`). Returns the first
    /// successful classification, or the last error once retries are
    /// exhausted. A cancelled request returns a failure response that is not
    /// adopted as the last response.
    pub async fn send_prompt(&self, prompt: &str) -> ClassifyResponse {
        self.cancel_request();
        let token = CancelToken::new();
        *self.inflight.lock().unwrap() = Some(token.clone());

        let mut last_error: Option<String> = None;

        for attempt in 1..=self.max_retries {
            if token.is_cancelled() {
                return Self::cancelled_response();
            }

            let context = {
                let mut host = self.host.lock().await;
                host.context().await
            };
            // The post-fetch check doubles as the pre-classification check.
            if token.is_cancelled() {
                return Self::cancelled_response();
            }
            let context = match context {
                Ok(context) => context,
                Err(err) => {
                    warn!(attempt, max = self.max_retries, error = %err, "context fetch failed");
                    last_error = Some(err.to_string());
                    self.backoff(attempt).await;
                    continue;
                }
            };

            let response = match self.classifier.classify(prompt, &context).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(attempt, max = self.max_retries, error = %err, "classification failed");
                    last_error = Some(err.to_string());
                    self.backoff(attempt).await;
                    continue;
                }
            };
            if token.is_cancelled() {
                return Self::cancelled_response();
            }

            return self.adopt(&token, response);
        }

        let response = ClassifyResponse::failure(
            last_error.unwrap_or_else(|| "Request failed after all retries".to_string()),
        );
        self.adopt(&token, response)
    }

    /// Trip the in-flight request's token, if any.
    pub fn cancel_request(&self) {
        if let Some(token) = self.inflight.lock().unwrap().take() {
            token.cancel();
        }
    }

    /// Hand the last successful response's operations to the execution
    /// engine. Consumes the pending operations; without any, returns an
    /// empty result list.
    pub async fn execute_pending(&self) -> Vec<OperationResult> {
        let Some(classification) = self.pending.lock().unwrap().take() else {
            return Vec::new();
        };
        info!(
            operations = classification.operations.len(),
            "executing pending operations"
        );
        let mut host = self.host.lock().await;
        let results = executor::execute_operations(&mut *host, &classification.operations).await;
        for result in results.iter().filter(|r| !r.success) {
            warn!(message = %result.message, error = ?result.error, "operation failed");
        }
        results
    }

    pub fn last_response(&self) -> Option<ClassifyResponse> {
        self.last_response.lock().unwrap().clone()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().unwrap().is_some()
    }

    /// Borrow the host for direct inspection or setup (selection, seeding).
    pub async fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        let mut host = self.host.lock().await;
        f(&mut host)
    }

    fn adopt(&self, token: &CancelToken, response: ClassifyResponse) -> ClassifyResponse {
        // A request that lost the single-flight race adopts nothing.
        if token.is_cancelled() {
            return Self::cancelled_response();
        }
        let mut inflight = self.inflight.lock().unwrap();
        if inflight
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(&current.0, &token.0))
        {
            *inflight = None;
        }
        drop(inflight);
        *self.last_response.lock().unwrap() = Some(response.clone());
        *self.pending.lock().unwrap() = response.classification().cloned();
        response
    }

    fn cancelled_response() -> ClassifyResponse {
        ClassifyResponse::failure("Request cancelled")
    }

    async fn backoff(&self, attempt: u32) {
        if attempt < self.max_retries {
            tokio::time::sleep(self.retry_delay * attempt).await;
        }
    }
}
