/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::scripted(..)` - Replies with canned responses in order
 * - `MockProvider::same_topic()` - Always answers "same topic, single story"
 * - `MockProvider::failing()` - Always fails with a connection error
 * - `MockProvider::garbage()` - Replies with text carrying no recognizable fields
 * - `MockProvider::slow(..)` - Delays every reply (for timeout testing)
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Canned reply for a single-story segment that continues into the next one
pub const SAME_TOPIC_REPLY: &str = "CONTAINS_MULTIPLE_STORIES: NO\nNUMBER_OF_STORIES: 1\nSUB_TOPICS:\nSPLIT_AFTER:\nDIFFERENT: NO\nREASONING: Both segments cover the same event.";

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Replies with the scripted responses in order, repeating the last one
    Scripted(Vec<String>),
    /// Always fails with an error
    Failing,
    /// Fails for the first `failures` calls, then replies with `reply`
    FailThenReply { failures: usize, reply: String },
    /// Replies with text that contains no decision fields
    Garbage,
    /// Waits before replying with the same-topic answer
    Slow { delay_ms: u64 },
}

/// Mock provider for exercising the classifier without a server
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of `complete` calls received
    request_count: Arc<AtomicUsize>,
    /// Every prompt received, in order
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with each response in turn
    pub fn scripted<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self::new(MockBehavior::Scripted(responses.into_iter().map(Into::into).collect()))
    }

    /// Always answer "same topic, no split"
    pub fn same_topic() -> Self {
        Self::scripted([SAME_TOPIC_REPLY])
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that replies with unparseable text
    pub fn garbage() -> Self {
        Self::new(MockBehavior::Garbage)
    }

    /// Create a mock that sleeps before replying
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, _model: &str, prompt: &str) -> Result<String, ProviderError> {
        let call_index = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.behavior {
            MockBehavior::Scripted(responses) => Ok(responses
                .get(call_index)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_default()),
            MockBehavior::Failing => {
                Err(ProviderError::ConnectionError("Mock provider failure".to_string()))
            }
            MockBehavior::FailThenReply { failures, reply } => {
                if call_index < *failures {
                    Err(ProviderError::ConnectionError(format!("Mock failure #{}", call_index + 1)))
                } else {
                    Ok(reply.clone())
                }
            }
            MockBehavior::Garbage => Ok("I am not sure what you mean.".to_string()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(SAME_TOPIC_REPLY.to_string())
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Mock provider failure".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
