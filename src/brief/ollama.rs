use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{analyst_prompt, BriefBackend, BriefRequest};
use crate::config::LlmConfig;
use crate::error::BriefError;

/// Locally hosted Ollama server; no credentials.
pub struct OllamaBackend {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(config: &LlmConfig) -> Result<Self, BriefError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ollama_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.ollama_url.trim_end_matches('/').to_owned(),
            model: config.ollama_model.clone(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.url)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[async_trait]
impl BriefBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn generate(&self, request: &BriefRequest) -> Result<String, BriefError> {
        let prompt = analyst_prompt(request);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
        };

        let response = self.client.post(self.generate_url()).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BriefError::Status {
                backend: "Ollama",
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| BriefError::Malformed(e.to_string()))?;

        let brief = parsed.response.unwrap_or_default();
        let brief = brief.trim();
        if brief.is_empty() {
            return Ok("LLM returned an empty response.".to_string());
        }
        Ok(brief.to_string())
    }

    fn failure_message(&self, error: &BriefError) -> String {
        format!(
            "LLM brief unavailable. \
             If you're using Docker, ensure the 'ollama' service is running and the model is pulled. \
             Details: {error}"
        )
    }
}
