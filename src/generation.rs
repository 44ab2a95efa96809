//! Generation provider abstraction and implementations.
//!
//! Defines the [`Generator`] trait: a black-box `prompt -> text` call to an
//! external language model. Two backends:
//! - **[`GeminiGenerator`]** — `POST /v1beta/models/{model}:generateContent`
//!   on the Google Generative Language API (`GOOGLE_API_KEY`).
//! - **[`OllamaGenerator`]** — `POST /api/generate` on a local Ollama
//!   instance.
//!
//! Generation calls are never retried internally: a failed request-level
//! operation stays visible to the caller instead of being papered over.
//! Repeated identical prompts may yield different text; nothing here
//! assumes idempotence.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::PipelineError;

#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-1.5-flash"`).
    fn model_name(&self) -> &str;

    /// Generate text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError>;
}

/// Create the [`Generator`] selected by configuration.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>, PipelineError> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiGenerator::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaGenerator::new(config)?)),
        other => Err(PipelineError::Configuration(format!(
            "unknown generation provider: '{}'. Must be gemini or ollama.",
            other
        ))),
    }
}

// ============ Gemini ============

pub struct GeminiGenerator {
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, PipelineError> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            PipelineError::Configuration(
                "GOOGLE_API_KEY environment variable not set".to_string(),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Service(format!(
                "Gemini generation error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response.json().await?;
        parse_gemini_text(&json)
    }
}

fn parse_gemini_text(json: &serde_json::Value) -> Result<String, PipelineError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            PipelineError::Service("invalid Gemini response: no candidates".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(PipelineError::Service(
            "Gemini returned an empty candidate".to_string(),
        ));
    }
    Ok(text)
}

// ============ Ollama ============

pub struct OllamaGenerator {
    model: String,
    url: String,
    client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, PipelineError> {
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            url,
            client,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        let url = format!("{}/api/generate", self.url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            PipelineError::Service(format!(
                "Ollama connection error (is Ollama running at {}?): {}",
                self.url, e
            ))
        })?;
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Service(format!(
                "Ollama generation error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response.json().await?;
        parse_ollama_text(&json)
    }
}

fn parse_ollama_text(json: &serde_json::Value) -> Result<String, PipelineError> {
    json.get("response")
        .and_then(|r| r.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            PipelineError::Service("invalid Ollama response: missing response field".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_text_joins_candidate_parts() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Rotate " }, { "text": "crops." }] }
            }]
        });
        assert_eq!(parse_gemini_text(&json).unwrap(), "Rotate crops.");
    }

    #[test]
    fn gemini_without_candidates_is_a_service_error() {
        let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            parse_gemini_text(&json),
            Err(PipelineError::Service(_))
        ));
    }

    #[test]
    fn ollama_text_reads_response_field() {
        let json = serde_json::json!({ "response": "Water early in the day.", "done": true });
        assert_eq!(parse_ollama_text(&json).unwrap(), "Water early in the day.");
    }

    #[test]
    fn ollama_without_response_is_a_service_error() {
        let json = serde_json::json!({ "done": true });
        assert!(matches!(
            parse_ollama_text(&json),
            Err(PipelineError::Service(_))
        ));
    }
}
