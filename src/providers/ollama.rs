use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Port Ollama listens on when the endpoint does not name one
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Sampling temperature sent with every chat request
    temperature: f32,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Random seed for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant, or tool)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// A user-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    /// How long to keep the model loaded in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Response message
    pub message: ChatMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Entry of the `/api/tags` model listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier, e.g. `llama3.2:3b`
    pub name: String,
    /// Size on disk in bytes
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// Builder methods for ChatRequest
impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            stream: Some(false),
            keep_alive: None,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        match &mut self.options {
            Some(options) => options.temperature = Some(temperature),
            None => {
                self.options = Some(GenerationOptions {
                    temperature: Some(temperature),
                    seed: None,
                    num_predict: None,
                });
            }
        }
        self
    }

    /// Set the keep-alive duration
    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    /// Disable streaming
    pub fn no_stream(mut self) -> Self {
        self.stream = Some(false);
        self
    }
}

/// Normalize an endpoint such as `localhost`, `host:port` or `https://host` into a base URL
pub fn parse_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url.host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?;

    let port = url.port().unwrap_or(if url.scheme() == "https" { 443 } else { DEFAULT_OLLAMA_PORT });

    Ok(format!("{}://{}:{}", url.scheme(), host, port))
}

impl Ollama {
    /// Create a new Ollama client for `endpoint` with a per-request timeout
    pub fn new(endpoint: &str, timeout_secs: u64, temperature: f32) -> Result<Self> {
        let base_url = parse_endpoint(endpoint)?;

        Ok(Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs.max(1)))
                // Force HTTP/1.1 - Ollama uses HTTP/1.1
                .http1_only()
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            temperature,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat with the Ollama API
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await.map_err(map_transport_error)?;
        parse_chat_response(&response_text)
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self.client.get(&url)
            .send()
            .await
            .map_err(map_transport_error)?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Invalid version response: {}", e)))?;

        response["version"].as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }

    /// List the models installed on the Ollama server
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let list: ModelList = self.client.get(&url)
            .send()
            .await
            .map_err(map_transport_error)?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Invalid model list: {}", e)))?;

        let mut models = list.models;
        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest::new(model, vec![ChatMessage::user(prompt)])
            .temperature(self.temperature)
            .no_stream();

        let response = self.chat(request).await?;
        debug!(
            "Ollama reply from {} (prompt tokens: {:?}, eval tokens: {:?})",
            response.model, response.prompt_eval_count, response.eval_count
        );
        Ok(response.message.content.trim().to_string())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let version = self.version().await?;
        debug!("Connected to Ollama {} at {}", version, self.base_url);
        Ok(())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::RequestFailed(format!("Request to Ollama timed out: {}", e))
    } else if e.is_connect() {
        ProviderError::ConnectionError(e.to_string())
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

/// Parse a chat reply, accepting both a single JSON object and a JSONL stream
pub fn parse_chat_response(response_text: &str) -> Result<ChatResponse, ProviderError> {
    match serde_json::from_str::<ChatResponse>(response_text) {
        Ok(chat_response) => Ok(chat_response),
        Err(e) => {
            // Log the raw response for debugging
            error!("Failed to parse Ollama API chat response: {}. Raw response (first 500 chars): {}",
                  e, response_text.chars().take(500).collect::<String>());

            // The response might be in JSONL format (streaming response)
            let chunks: Vec<serde_json::Value> = response_text.lines()
                .filter(|line| !line.trim().is_empty())
                .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
                .collect();

            let Some(last) = chunks.last() else {
                return Err(ProviderError::ParseError(format!(
                    "Failed to parse Ollama API chat response: {}. Response contains invalid JSON.", e
                )));
            };

            // Concatenate all the message content pieces
            let content: String = chunks.iter()
                .filter_map(|chunk| chunk.get("message")?.get("content")?.as_str())
                .collect();

            Ok(ChatResponse {
                model: last.get("model").and_then(|v| v.as_str()).unwrap_or("unknown").to_string(),
                created_at: last.get("created_at").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content,
                },
                done: last.get("done").and_then(|v| v.as_bool()).unwrap_or(true),
                prompt_eval_count: last.get("prompt_eval_count").and_then(|v| v.as_u64()),
                eval_count: last.get("eval_count").and_then(|v| v.as_u64()),
            })
        }
    }
}
