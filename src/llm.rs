use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// API key that switches the client to offline mode.
pub const DUMMY_API_KEY: &str = "dummy-api-key";

/// Free-text generation behind the advisory pipeline.
#[async_trait]
pub trait NarrativeService: Send + Sync {
    /// Single attempt; the raw reply text on success.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    OpenAi,
}

impl LlmProvider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::OpenAi => "https://api.openai.com/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-1.5-pro",
            LlmProvider::OpenAi => "gpt-4",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(LlmProvider::Gemini),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(AdvisorError::Config(format!(
                "Unknown LLM provider '{}', expected 'gemini' or 'openai'",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    provider: LlmProvider,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(
        provider: LlmProvider,
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisorError::Config(format!("Failed to build LLM client: {}", e)))?;
        Ok(Self {
            client,
            provider,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub fn is_offline(&self) -> bool {
        self.api_key == DUMMY_API_KEY
    }

    pub async fn call_llm(&self, prompt: &str) -> Result<String> {
        // Offline mode: an empty reply leaves every field to the dataset
        if self.is_offline() {
            warn!("No LLM API key configured, returning empty reply");
            return Ok(String::new());
        }

        match self.provider {
            LlmProvider::Gemini => self.call_gemini(prompt).await,
            LlmProvider::OpenAi => self.call_openai(prompt).await,
        }
    }

    async fn call_gemini(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [
                {
                    "parts": [
                        { "text": prompt }
                    ]
                }
            ]
        });

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisorError::Llm(format!("LLM API call failed: {}", e)))?;

        let response_json = Self::read_json(response).await?;
        extract_gemini_text(&response_json)
    }

    async fn call_openai(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an agricultural advisor. Follow the requested output format exactly."
                },
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.2,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisorError::Llm(format!("LLM API call failed: {}", e)))?;

        let response_json = Self::read_json(response).await?;
        extract_openai_text(&response_json)
    }

    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value> {
        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AdvisorError::Llm(format!("LLM API error ({}): {}", status, error_text)));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AdvisorError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        if let Some(error) = response_json.get("error") {
            return Err(AdvisorError::Llm(format!("LLM API error: {}", error)));
        }
        Ok(response_json)
    }
}

#[async_trait]
impl NarrativeService for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Sending advisory prompt ({} chars) to {:?}", prompt.len(), self.provider);
        let text = self.call_llm(prompt).await?;
        info!("LLM reply received ({} chars)", text.len());
        Ok(text)
    }
}

/// `candidates[0].content.parts[*].text`, concatenated.
pub fn extract_gemini_text(response_json: &serde_json::Value) -> Result<String> {
    let parts = response_json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            AdvisorError::Llm(format!("No content in LLM response: {}", response_json))
        })?;
    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        return Err(AdvisorError::Llm("Empty content in LLM response".to_string()));
    }
    Ok(text)
}

/// `choices[0].message.content`
pub fn extract_openai_text(response_json: &serde_json::Value) -> Result<String> {
    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| {
            AdvisorError::Llm(format!("No choices array in LLM response: {}", response_json))
        })?;

    let first = choices
        .first()
        .ok_or_else(|| AdvisorError::Llm("Empty choices array in LLM response".to_string()))?;

    if first.get("finish_reason").and_then(|r| r.as_str()) == Some("content_filter") {
        return Err(AdvisorError::Llm("LLM response was filtered by content policy".to_string()));
    }

    let content = first["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            AdvisorError::Llm(format!("No content in LLM response: {}", response_json))
        })?;
    if content.trim().is_empty() {
        return Err(AdvisorError::Llm("Empty content in LLM response".to_string()));
    }
    Ok(content.to_string())
}
