// src/probes/mod.rs
//! Built-in probes for each target kind.
//!
//! Every probe here is a leaf: it performs one external check and either
//! returns its payload or fails. Scheduling, deadlines and merging belong to
//! the dispatcher.

pub mod email;
pub mod ip;
pub mod platforms;
pub mod username;

use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::engine::{single_field, Fields, Probe, ProbeSet};
use crate::error::{OsintResult, ProbeError, ProbeResult};
use crate::target::{Target, TargetKind};
use crate::utils::HttpClient;

/// Shared resources handed to probe constructors
#[derive(Clone)]
pub struct ProbeContext {
    pub config: Arc<Config>,
    pub http: HttpClient,
    pub resolver: Arc<TokioAsyncResolver>,
}

impl ProbeContext {
    pub fn new(config: Arc<Config>) -> OsintResult<Self> {
        let http = HttpClient::new(
            Some(config.global.user_agent.clone()),
            Some(config.global.http_timeout_secs),
        )?;
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

        Ok(Self {
            config,
            http,
            resolver: Arc::new(resolver),
        })
    }
}

/// Build the built-in probe set for a target kind
pub fn probe_set(kind: TargetKind, ctx: &ProbeContext) -> OsintResult<ProbeSet> {
    let probes = match kind {
        TargetKind::Email => email::probes(ctx),
        TargetKind::Ip => ip::probes(ctx),
        TargetKind::Username => username::probes(ctx),
    };
    ProbeSet::from_probes(kind, probes)
}

/// Append path segments to a base URL, percent-encoding each one
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> ProbeResult<String> {
    let mut url = Url::parse(base).map_err(|e| ProbeError::Parse(format!("invalid base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ProbeError::Parse(format!("base URL cannot take a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.to_string())
}

/// Attach query parameters to a base URL
pub(crate) fn endpoint_with_query(base: &str, params: &[(&str, &str)]) -> ProbeResult<String> {
    Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| ProbeError::Parse(format!("invalid base URL {}: {}", base, e)))
}

type UrlBuilder = dyn Fn(&Target) -> ProbeResult<String> + Send + Sync;

/// Probe that GETs one JSON endpoint and stores the body under a single field
pub struct HttpJsonProbe {
    name: String,
    description: String,
    http: HttpClient,
    url: Box<UrlBuilder>,
    headers: Vec<(String, String)>,
    pointer: Option<String>,
    not_found: Option<Value>,
    missing_credential: Option<String>,
}

impl HttpJsonProbe {
    pub fn new<F>(name: &str, http: HttpClient, url: F) -> Self
    where
        F: Fn(&Target) -> ProbeResult<String> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: String::new(),
            http,
            url: Box::new(url),
            headers: Vec::new(),
            pointer: None,
            not_found: None,
            missing_credential: None,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Keep only the part of the body at this JSON pointer
    pub fn extract(mut self, pointer: &str) -> Self {
        self.pointer = Some(pointer.to_string());
        self
    }

    /// Treat a 404 as a successful lookup with this value
    pub fn not_found_as(mut self, value: Value) -> Self {
        self.not_found = Some(value);
        self
    }

    /// Send the credential as a header, or fail every run when it is absent
    pub fn credential(mut self, header: &str, value: Option<&str>, config_key: &str) -> Self {
        match value {
            Some(secret) => self.header(header, secret),
            None => {
                self.missing_credential = Some(config_key.to_string());
                self
            }
        }
    }
}

#[async_trait]
impl Probe for HttpJsonProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self, target: &Target) -> ProbeResult<Fields> {
        if let Some(key) = &self.missing_credential {
            return Err(ProbeError::MissingCredential(key.clone()));
        }

        let url = (self.url)(target)?;
        let headers: Vec<(&str, &str)> = self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let body = match self.http.get_json(&url, &headers).await {
            Ok(body) => body,
            Err(ProbeError::Status { status: 404, .. }) if self.not_found.is_some() => {
                return Ok(single_field(self.name.clone(), self.not_found.clone().unwrap_or(Value::Null)));
            }
            Err(e) => return Err(e),
        };

        let value = match &self.pointer {
            Some(pointer) => body
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| ProbeError::Parse(format!("response has no {}", pointer)))?,
            None => body,
        };

        Ok(single_field(self.name.clone(), value))
    }
}
