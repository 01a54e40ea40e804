//! Executive brief generation.
//!
//! Scan results are compacted to a bounded payload, handed to a
//! text-generation backend, and the answer is returned as plain text.
//! [`BriefGenerator::generate`] never fails: backend errors come back as an
//! explanatory sentence in place of the brief.
//!
//! | Backend | Provider | Endpoint |
//! |---------|----------|----------|
//! | [`OllamaBackend`] | `ollama` | `{ollama_url}/api/generate` |
//! | [`OpenAiBackend`] | `openai` | OpenAI Responses API |

mod ollama;
mod openai;
mod prompt;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
pub use prompt::{analyst_instructions, analyst_prompt};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::BriefError;
use crate::model::{Ecosystem, PackageResult};

/// Advisory fields forwarded to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactVulnerability {
    pub id: String,
    pub summary: Option<String>,
    pub aliases: Vec<String>,
}

/// A package with at least one advisory, reduced for the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactResult {
    pub package: String,
    pub ecosystem: Ecosystem,
    pub vuln_count: usize,
    pub vulnerabilities: Vec<CompactVulnerability>,
}

/// What a backend receives.
#[derive(Debug, Clone, PartialEq)]
pub struct BriefRequest {
    pub risk_score: u8,
    pub findings: Vec<CompactResult>,
}

impl BriefRequest {
    pub fn new(results: &[PackageResult], risk_score: u8, max_vulns: usize) -> Self {
        Self {
            risk_score,
            findings: compact_results(results, max_vulns),
        }
    }

    pub fn findings_json(&self) -> String {
        serde_json::to_string(&self.findings).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn findings_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.findings).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Keeps at most `max_vulns` advisories in total, in result order.
///
/// Packages without advisories are dropped. `vuln_count` still reports the
/// package's full count even when its list was cut short.
pub fn compact_results(results: &[PackageResult], max_vulns: usize) -> Vec<CompactResult> {
    let mut compacted = Vec::new();
    let mut kept = 0;

    for result in results {
        if result.vulnerabilities.is_empty() {
            continue;
        }

        let take = max_vulns.saturating_sub(kept);
        let vulnerabilities: Vec<CompactVulnerability> = result
            .vulnerabilities
            .iter()
            .take(take)
            .map(|v| CompactVulnerability {
                id: v.id.clone(),
                summary: v.summary.clone(),
                aliases: v.aliases.clone(),
            })
            .collect();
        kept += vulnerabilities.len();

        compacted.push(CompactResult {
            package: result.package.clone(),
            ecosystem: result.ecosystem.clone(),
            vuln_count: result.vuln_count,
            vulnerabilities,
        });

        if kept >= max_vulns {
            break;
        }
    }

    compacted
}

/// A text-generation service that can write the brief.
#[async_trait]
pub trait BriefBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &BriefRequest) -> Result<String, BriefError>;

    /// Text shown in place of the brief when [`generate`](Self::generate) fails.
    fn failure_message(&self, error: &BriefError) -> String {
        format!("{} brief failed: {}", self.name(), error)
    }
}

/// Produces executive briefs through the backend chosen at construction.
pub struct BriefGenerator {
    backend: Box<dyn BriefBackend>,
    max_vulns: usize,
}

impl BriefGenerator {
    pub fn new(backend: Box<dyn BriefBackend>, max_vulns: usize) -> Self {
        Self { backend, max_vulns }
    }

    /// Builds the generator for the configured provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn from_config(config: &LlmConfig) -> Result<Self, BriefError> {
        let backend: Box<dyn BriefBackend> = match config.provider {
            LlmProvider::Ollama => Box::new(OllamaBackend::new(config)?),
            LlmProvider::OpenAi => Box::new(OpenAiBackend::new(config)?),
        };
        Ok(Self::new(backend, config.max_brief_vulns))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Writes the brief, or an explanation of why it could not be written.
    pub async fn generate(&self, results: &[PackageResult], risk_score: u8) -> String {
        let request = BriefRequest::new(results, risk_score, self.max_vulns);
        info!(
            backend = self.backend.name(),
            findings = request.findings.len(),
            "generating executive brief"
        );

        match self.backend.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "brief generation failed");
                self.backend.failure_message(&e)
            }
        }
    }
}
