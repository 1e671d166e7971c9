use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::ModelError;

/// Anything that turns a prompt into free-form text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, only when every one of its parts is text.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        if parts.is_empty() {
            return None;
        }
        parts
            .iter()
            .map(|p| p.text.as_deref())
            .collect::<Option<Vec<_>>>()
            .map(|texts| texts.concat())
    }

    /// Every text part of every candidate, skipping non-text parts.
    fn parts_text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    fn into_text(self) -> String {
        if let Some(text) = self.text() {
            return text;
        }
        debug!("Primary text accessor empty, falling back to candidate parts");
        self.parts_text().unwrap_or_else(|| {
            warn!("Gemini response carried no text");
            String::new()
        })
    }
}

/// Extract reply text from a raw `generateContent` body. Unreadable bodies
/// yield an empty string.
pub fn response_text(body: &str) -> String {
    match serde_json::from_str::<GenerateContentResponse>(body) {
        Ok(response) => response.into_text(),
        Err(e) => {
            warn!("Failed to parse Gemini response body: {}", e);
            String::new()
        }
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn unavailable(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::ServiceUnavailable(format!("request timed out after {:?}", self.timeout))
        } else {
            ModelError::ServiceUnavailable(e.to_string())
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        info!("Gemini Request [URL: {}] with prompt of {} bytes", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        let status = response.status();
        info!("Response status: {}", status);

        let body = response.text().await.map_err(|e| self.unavailable(e))?;

        if !status.is_success() {
            return Err(ModelError::ServiceRejected {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("Read {} bytes from response", body.len());
        Ok(response_text(&body))
    }
}
