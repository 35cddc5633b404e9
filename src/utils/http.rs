// src/utils/http.rs
use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::error::{OsintError, OsintResult, ProbeError, ProbeResult};

/// Shared HTTP client used by every network probe
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(user_agent: Option<String>, timeout_secs: Option<u64>) -> OsintResult<Self> {
        let user_agent = user_agent.unwrap_or_else(|| format!("probehound/{}", env!("CARGO_PKG_VERSION")));
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(5));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .map_err(|e| OsintError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, user_agent })
    }

    /// GET a URL and decode a JSON body, failing on any non-success status
    pub async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> ProbeResult<Value> {
        debug!("GET {}", url);

        let mut request = self.client.get(url).header(header::ACCEPT, "application/json");
        request = with_headers(request, headers);

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// HEAD a URL, following redirects, and return the final status
    pub async fn head_status(&self, url: &str, user_agent: Option<&str>) -> ProbeResult<StatusCode> {
        debug!("HEAD {}", url);

        let mut request = self.client.head(url);
        if let Some(agent) = user_agent {
            request = request.header(header::USER_AGENT, agent);
        }

        Ok(request.send().await?.status())
    }

    /// Get the user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

fn with_headers(mut request: RequestBuilder, headers: &[(&str, &str)]) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    request
}
