//! OpenAI chat-completions detector

use super::{build_prompt, parse_detection_response, ExternalPiiDetector};
use crate::config::{DetectorConfig, RetryConfig, SecretString};
use crate::domain::{ExternalDetection, ExternalDetectionError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
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
    #[serde(default)]
    content: Option<String>,
}

/// Detector calling an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiDetector {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    temperature: f32,
    timeout_seconds: u64,
    retry: RetryConfig,
}

impl OpenAiDetector {
    /// Create a detector from configuration
    ///
    /// # Errors
    ///
    /// Fails when no API key is configured or the HTTP client cannot be
    /// built.
    pub fn new(config: &DetectorConfig) -> Result<Self, ExternalDetectionError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ExternalDetectionError::Transport("no API key configured".to_string())
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .build()
            .map_err(|e| ExternalDetectionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
            retry: config.retry.clone(),
        })
    }

    /// One request, no retry
    async fn request(&self, prompt: &str) -> Result<String, ExternalDetectionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret().as_ref()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ExternalDetectionError::Status {
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExternalDetectionError::InvalidResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ExternalDetectionError::InvalidResponse("response has no message content".to_string())
            })
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> ExternalDetectionError {
        if err.is_timeout() {
            ExternalDetectionError::Timeout(self.timeout_seconds)
        } else {
            ExternalDetectionError::Transport(err.to_string())
        }
    }

    /// Retry transport failures and server-side statuses with exponential backoff
    async fn request_with_retry(&self, prompt: &str) -> Result<String, ExternalDetectionError> {
        let max_retries = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match self.request(prompt).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries || !is_retryable(&e) {
                        return Err(e);
                    }

                    let delay_ms = (self.retry.initial_delay_ms as f64
                        * self.retry.backoff_multiplier.powf((attempt - 1) as f64))
                        as u64;
                    let delay_ms = delay_ms.min(self.retry.max_delay_ms);

                    crate::log_retry_attempt!(attempt, max_retries, e);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

fn is_retryable(err: &ExternalDetectionError) -> bool {
    match err {
        ExternalDetectionError::Transport(_) => true,
        ExternalDetectionError::Status { status, .. } => *status == 429 || *status >= 500,
        ExternalDetectionError::Timeout(_) | ExternalDetectionError::InvalidResponse(_) => false,
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}

#[async_trait]
impl ExternalPiiDetector for OpenAiDetector {
    async fn detect(
        &self,
        text: &str,
        directive: &str,
    ) -> Result<ExternalDetection, ExternalDetectionError> {
        if text.trim().is_empty() {
            return Ok(ExternalDetection::default());
        }

        let start = std::time::Instant::now();
        let prompt = build_prompt(text, directive);
        let content = self.request_with_retry(&prompt).await?;
        let detection = parse_detection_response(&content)?;

        tracing::debug!(
            model = %self.model,
            detections = detection.total(),
            duration_ms = start.elapsed().as_millis() as u64,
            "External detection completed"
        );

        Ok(detection)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
