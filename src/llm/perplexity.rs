//! Perplexity chat-completions client
//!
//! The response is validated once here: anything other than a non-empty
//! `choices[0].message.content` string is an upstream error.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::TextGenerator;
use crate::PlannerError;
use crate::config::LlmConfig;

const SYSTEM_PROMPT: &str = "You are an expert travel planner. Answer with a well-structured \
itinerary in markdown.";

/// Perplexity API client
pub struct PerplexityClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl PerplexityClient {
    /// Create a client from configuration, failing when no API key is set
    pub fn from_config(config: &LlmConfig) -> crate::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                PlannerError::not_configured("Itinerary generation", "no Perplexity API key")
            })?;

        let client = Client::builder()
            .user_agent(concat!("travelplanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlannerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for PerplexityClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> crate::Result<String> {
        let start_time = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Language model request failed: {}", e);
                PlannerError::upstream(format!("Language model request failed: {e}"))
            })?;

        let status = response.status();
        debug!("Language model responded with {}", status);
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Language model error {}: {}", status, detail);
            return Err(match status.as_u16() {
                401 | 403 => PlannerError::upstream("Language model rejected the API key"),
                429 => PlannerError::upstream("Language model rate limit exceeded"),
                _ => PlannerError::upstream(format!("Language model returned HTTP {status}")),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| PlannerError::upstream(format!("Failed to read model response: {e}")))?;
        let content = parse_completion(&text)?;

        info!(
            "Generated {} characters in {:.3}s",
            content.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(content)
    }
}

/// Extract the first choice's text from a chat-completions body
fn parse_completion(body: &str) -> crate::Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| PlannerError::upstream(format!("Malformed model response: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| PlannerError::upstream("Model response contained no text"))
}
