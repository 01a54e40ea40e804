use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::OsvConfig;
use crate::error::QueryError;
use crate::model::{truncate_utf8, Ecosystem, VulnerabilityRecord, MAX_DETAILS_BYTES};

pub const OSV_API_URL: &str = "https://api.osv.dev";

/// Longest error body echoed back into a package result.
const MAX_ERROR_BODY: usize = 200;

/// Client for the OSV.dev single-package query endpoint.
pub struct OsvClient {
    client: reqwest::Client,
    base_url: String,
}

impl OsvClient {
    /// Builds a client with the configured base URL and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: &OsvConfig) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("depbrief/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
        })
    }

    fn query_url(&self) -> String {
        format!("{}/v1/query", self.base_url)
    }
}

#[derive(Serialize)]
struct OsvQuery<'a> {
    package: OsvPackage<'a>,
}

#[derive(Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Deserialize)]
struct OsvQueryResponse {
    #[serde(default)]
    vulns: Option<Vec<OsvVuln>>,
}

#[derive(Deserialize)]
struct OsvVuln {
    #[serde(default)]
    id: Option<String>,
    summary: Option<String>,
    details: Option<String>,
    #[serde(default)]
    aliases: Option<Vec<String>>,
    #[serde(default)]
    severity: Option<Vec<Value>>,
    #[serde(default)]
    references: Option<Vec<Value>>,
}

impl From<OsvVuln> for VulnerabilityRecord {
    fn from(vuln: OsvVuln) -> Self {
        VulnerabilityRecord {
            id: vuln.id.unwrap_or_default(),
            summary: vuln.summary,
            details: vuln
                .details
                .map(|d| truncate_utf8(&d, MAX_DETAILS_BYTES).to_owned()),
            aliases: vuln.aliases.unwrap_or_default(),
            severity: vuln.severity.unwrap_or_default(),
            references: vuln.references.unwrap_or_default(),
        }
    }
}

/// Decodes an OSV query response body into advisory records.
fn parse_response(body: &str) -> Result<Vec<VulnerabilityRecord>, QueryError> {
    let response: OsvQueryResponse =
        serde_json::from_str(body).map_err(|e| QueryError::Decode(e.to_string()))?;

    Ok(response
        .vulns
        .unwrap_or_default()
        .into_iter()
        .map(VulnerabilityRecord::from)
        .collect())
}

#[async_trait]
impl super::VulnerabilitySource for OsvClient {
    fn name(&self) -> &'static str {
        "OSV.dev"
    }

    async fn query(
        &self,
        package: &str,
        ecosystem: &Ecosystem,
    ) -> Result<Vec<VulnerabilityRecord>, QueryError> {
        let query = OsvQuery {
            package: OsvPackage {
                name: package,
                ecosystem: ecosystem.as_str(),
            },
        };

        let response = self.client.post(self.query_url()).json(&query).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(QueryError::Status {
                status: status.as_u16(),
                body: truncate_utf8(body.trim(), MAX_ERROR_BODY).to_owned(),
            });
        }

        parse_response(&body)
    }
}
