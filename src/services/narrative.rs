use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when requesting a narrative explanation
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Narrative service returned status {0}")]
    ApiError(u16),

    #[error("Narrative response carried no completion text")]
    EmptyCompletion,
}

/// Facts handed to the narrative service for one candidate
///
/// Only already-computed aggregates cross this boundary; raw member data
/// never does.
#[derive(Debug, Clone)]
pub struct ExplanationPrompt {
    pub name: String,
    pub mean_score: f64,
    pub fairness_score: f64,
    pub eliminated_count: usize,
    pub key_tradeoffs: Vec<String>,
}

const SYSTEM_PROMPT: &str = "You explain restaurant choices to a group of friends. \
Be friendly, concise, playful, and emphasize fairness and compromise. \
Keep it to 2 short sentences max.";

/// Chat-completion client for the narrative service
///
/// The service is unreliable and rate-limited; every call is bounded by the
/// client timeout and callers are expected to fall back locally on failure.
#[derive(Clone)]
pub struct NarrativeClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl NarrativeClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
        max_tokens: u32,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Request a one-to-two-sentence explanation for one ranked candidate
    pub async fn generate(&self, prompt: &ExplanationPrompt) -> Result<String, NarrativeError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let user_prompt = [
            format!("Restaurant: {}", prompt.name),
            format!("Mean score: {:.3}", prompt.mean_score),
            format!("Fairness score: {:.3}", prompt.fairness_score),
            format!("Eliminated count: {}", prompt.eliminated_count),
            format!("Key tradeoffs: {}", prompt.key_tradeoffs.join(" | ")),
        ]
        .join("\n");

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt },
            ],
            "max_tokens": self.max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NarrativeError::ApiError(response.status().as_u16()));
        }

        let body: ChatResponse = response.json().await?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(NarrativeError::EmptyCompletion)?;

        Ok(text)
    }
}
