/*!
 * Provider-backed topic classifier.
 *
 * Each decision is one prompt/reply exchange. Every attempt is bounded by a
 * timeout, and transport failures are retried with exponential backoff.
 * Replies that arrive but cannot be parsed are not retried.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use super::prompt::build_prompt;
use super::response::parse_response;
use super::{DecisionRequest, SegmentDecider, TopicDecision};
use crate::errors::ProviderError;
use crate::providers::Provider;

/// Classifier that asks an LLM provider for each decision
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    provider: Arc<dyn Provider>,
    model: String,
    timeout: Duration,
    retry_count: u32,
    retry_backoff_ms: u64,
}

impl TopicClassifier {
    /// Create a classifier with a 120 second timeout and no retries
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout: Duration::from_secs(120),
            retry_count: 0,
            retry_backoff_ms: 1000,
        }
    }

    /// Per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries after a transport failure, and the initial backoff between them
    pub fn with_retries(mut self, retry_count: u32, retry_backoff_ms: u64) -> Self {
        self.retry_count = retry_count;
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    /// Model name used for every request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the prompt, retrying transport failures.
    async fn request_with_retry(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.provider.complete(&self.model, prompt)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.timeout.as_secs())),
            };

            match result {
                Ok(reply) => return Ok(reply),
                Err(e) if attempt < self.retry_count => {
                    let backoff = self.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        "Classifier request failed (attempt {}/{}): {}. Retrying in {}ms",
                        attempt + 1,
                        self.retry_count + 1,
                        e,
                        backoff
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl SegmentDecider for TopicClassifier {
    async fn decide(&self, request: DecisionRequest<'_>) -> TopicDecision {
        let prompt = build_prompt(&request);

        match self.request_with_retry(&prompt).await {
            Ok(raw) => {
                debug!("Segment #{} raw classifier reply: {}", request.segment_number, raw);
                let decision = parse_response(&raw);
                if decision.defaulted {
                    warn!(
                        "Segment #{}: classifier reply had no recognizable fields, using defaults",
                        request.segment_number
                    );
                }
                decision
            }
            Err(e) => {
                warn!(
                    "Segment #{}: classification failed, using defaults: {}",
                    request.segment_number, e
                );
                TopicDecision::fallback(format!("Error occurred during analysis: {}", e))
            }
        }
    }

    fn source_name(&self) -> String {
        format!("{}/{}", self.provider.name(), self.model)
    }
}
