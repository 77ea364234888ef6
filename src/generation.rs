//! Client for the generative-text service that critiques plans.
//!
//! The production implementation talks to the Gemini `generateContent`
//! endpoint. Calls are made once; failures are returned to the caller as-is.

use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use crate::config::GeminiConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model's free-text answer to `prompt`.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Builds the generator for the given settings. Without an API key every
/// call fails.
pub fn from_config(cfg: &GeminiConfig) -> anyhow::Result<std::sync::Arc<dyn TextGenerator>> {
    match &cfg.api_key {
        Some(key) => Ok(std::sync::Arc::new(GeminiClient::new(
            key.clone(),
            cfg.model.clone(),
            cfg.base_url.clone(),
        )?)),
        None => {
            warn!("GEMINI_API_KEY not set; plan analysis is disabled");
            Ok(std::sync::Arc::new(UnconfiguredGenerator))
        }
    }
}

pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Err(anyhow!("text generation service is not configured"))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(body: &str) -> anyhow::Result<String> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).context("parse generateContent response")?;
    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("generation service returned no candidates"))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        anyhow::bail!(
            "generation service returned an empty answer (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to reach generation service");
                anyhow!("failed to reach generation service: {e}")
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("read generation service response")?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(%status, "generation service returned an error");
            anyhow::bail!("generation service error ({status}): {detail}");
        }

        let text = extract_text(&body)?;
        debug!(chars = text.len(), "generation completed");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_candidate_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Eat more "},{"text":"vegetables."}]},"finishReason":"STOP"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Eat more vegetables.");
    }

    #[test]
    fn empty_candidates_is_an_error() {
        assert!(extract_text(r#"{"candidates":[]}"#).is_err());
        let err = extract_text(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn url_uses_model_and_trimmed_base() {
        let client = GeminiClient::new(
            "k".into(),
            "gemini-2.5-flash".into(),
            "https://example.test/v1beta/".into(),
        )
        .unwrap();
        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(!format!("{client:?}").contains("\"k\""));
    }

    #[tokio::test]
    async fn unconfigured_generator_always_fails() {
        let err = UnconfiguredGenerator.generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
