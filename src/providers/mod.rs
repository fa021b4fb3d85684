/*!
 * Provider implementations for topic classification backends.
 *
 * This module contains client implementations for LLM providers:
 * - Ollama: Local LLM server
 * - Mock: Deterministic provider for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the topic classifier.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Send a single user prompt to `model` and return the reply text
    ///
    /// # Arguments
    /// * `model` - Model identifier understood by the provider
    /// * `prompt` - Full prompt text
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw reply or an error
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider identifier used in logs and the output header
    fn name(&self) -> &str;
}

pub mod mock;
pub mod ollama;
