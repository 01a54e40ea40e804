use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{analyst_instructions, BriefBackend, BriefRequest};
use crate::config::LlmConfig;
use crate::error::BriefError;

/// OpenAI Responses API, authenticated with a bearer key.
pub struct OpenAiBackend {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiBackend {
    pub fn new(config: &LlmConfig) -> Result<Self, BriefError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.openai_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.openai_url.clone(),
            model: config.openai_model.clone(),
            api_key: config.openai_api_key.clone(),
        })
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: [InputMessage; 2],
}

#[derive(Serialize)]
struct InputMessage {
    role: &'static str,
    content: String,
}

/// Concatenates every `output_text` part of a Responses API reply.
fn extract_output_text(reply: &Value) -> String {
    let mut out = String::new();

    let items = reply.get("output").and_then(Value::as_array);
    for item in items.into_iter().flatten() {
        let parts = item.get("content").and_then(Value::as_array);
        for part in parts.into_iter().flatten() {
            if part.get("type").and_then(Value::as_str) == Some("output_text") {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    out.push_str(text);
                }
            }
        }
    }

    out
}

#[async_trait]
impl BriefBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn generate(&self, request: &BriefRequest) -> Result<String, BriefError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(BriefError::MissingCredential("OPENAI_API_KEY"))?;

        let body = ResponsesRequest {
            model: &self.model,
            input: [
                InputMessage {
                    role: "system",
                    content: analyst_instructions(request.risk_score),
                },
                InputMessage {
                    role: "user",
                    content: request.findings_json(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BriefError::Status {
                backend: "OpenAI",
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: Value =
            serde_json::from_str(&text).map_err(|e| BriefError::Malformed(e.to_string()))?;

        let brief = extract_output_text(&reply);
        let brief = brief.trim();
        if brief.is_empty() {
            return Ok("OpenAI returned an empty response.".to_string());
        }
        Ok(brief.to_string())
    }

    fn failure_message(&self, error: &BriefError) -> String {
        match error {
            BriefError::MissingCredential(_) => {
                "OPENAI_API_KEY is not set. Set it or use LLM_PROVIDER=ollama.".to_string()
            }
            other => format!("OpenAI brief failed: {other}"),
        }
    }
}
