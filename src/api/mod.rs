// Gemini API client

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::AppConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API key not set (export GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("{0}")]
    Service(String),

    #[error("failed to parse streaming response: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, ApiError>> + Send>>;

/// A hosted model that answers a request with an ordered stream of fragments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_stream(
        &self,
        request: GenerateContentRequest,
    ) -> Result<FragmentStream, ApiError>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Selects the endpoint; not part of the body.
    #[serde(skip)]
    pub model: String,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    /// A single user turn with a system instruction on the side.
    pub fn single_turn(model: &str, user_text: String, system_text: &str) -> Self {
        Self {
            model: model.to_string(),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(user_text)],
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(system_text.to_string())],
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub const fn text(text: String) -> Self {
        Self { text: Some(text) }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

impl GenerateContentResponse {
    /// Text carried by this fragment, `None` when it has none.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Human-readable message from an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

/// Parse one SSE line. Only non-empty `data:` fields produce an item.
fn parse_sse_line(line: &str) -> Option<Result<GenerateContentResponse, ApiError>> {
    let data = line.trim_end_matches(['\r', '\n']).strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    let parsed = serde_json::from_str::<GenerateContentResponse>(data).map_err(ApiError::from);
    Some(parsed.and_then(|response| match response.error {
        Some(error) => Err(ApiError::Service(error.message)),
        None => Ok(response),
    }))
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiClient {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        request_timeout: Option<u64>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(secs) = request_timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn from_config(config: &AppConfig, api_key: Option<String>) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), api_key, config.request_timeout)
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:streamGenerateContent?alt=sse",
            self.base_url
        )
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    /// Open the stream and yield one response per SSE `data:` line
    async fn generate_stream(
        &self,
        request: GenerateContentRequest,
    ) -> Result<FragmentStream, ApiError> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;
        let url = self.stream_url(&request.model);

        debug!(model = %request.model, "sending streamGenerateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "generation request rejected");
            return Err(ApiError::Status {
                status,
                message: error_message(&body),
            });
        }

        info!(model = %request.model, "generation stream opened");

        // Buffer bytes until a full line is available; events never span lines here
        let stream = futures::stream::unfold(
            (response.bytes_stream(), Vec::<u8>::new()),
            |(mut byte_stream, mut buffer)| async move {
                loop {
                    if let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                        let rest = buffer.split_off(pos + 1);
                        let line = std::mem::replace(&mut buffer, rest);
                        if let Some(item) = parse_sse_line(&String::from_utf8_lossy(&line)) {
                            return Some((item, (byte_stream, buffer)));
                        }
                        continue;
                    }

                    match byte_stream.next().await {
                        Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                        Some(Err(e)) => {
                            return Some((Err(ApiError::Http(e)), (byte_stream, buffer)));
                        }
                        None => {
                            // Unterminated final line
                            let line = std::mem::take(&mut buffer);
                            let item = parse_sse_line(&String::from_utf8_lossy(&line))?;
                            return Some((item, (byte_stream, buffer)));
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}
