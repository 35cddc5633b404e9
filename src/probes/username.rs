// src/probes/username.rs
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::platforms::{Platform, PLATFORMS};
use super::ProbeContext;
use crate::engine::{single_field, Fields, Probe};
use crate::error::{ProbeError, ProbeResult};
use crate::target::Target;
use crate::utils::HttpClient;

/// Final statuses taken as "profile exists"
const FOUND_STATUSES: [u16; 4] = [200, 301, 302, 303];

/// One probe per known platform
pub fn probes(ctx: &ProbeContext) -> Vec<Arc<dyn Probe>> {
    PLATFORMS
        .iter()
        .map(|platform| {
            Arc::new(PlatformProbe::new(
                *platform,
                ctx.http.clone(),
                ctx.config.global.browser_user_agent.clone(),
            )) as Arc<dyn Probe>
        })
        .collect()
}

/// Checks whether a profile URL for the username resolves on one platform.
///
/// The payload is keyed by the platform name, so platform probes never
/// collide in the merged result.
pub struct PlatformProbe {
    platform: Platform,
    http: HttpClient,
    user_agent: String,
}

impl PlatformProbe {
    pub fn new(platform: Platform, http: HttpClient, user_agent: String) -> Self {
        Self {
            platform,
            http,
            user_agent,
        }
    }
}

#[async_trait]
impl Probe for PlatformProbe {
    fn name(&self) -> &str {
        self.platform.name
    }

    fn description(&self) -> &str {
        self.platform.category
    }

    async fn run(&self, target: &Target) -> ProbeResult<Fields> {
        let username = match target {
            Target::Username(name) => name,
            other => return Err(ProbeError::Parse(format!("expected a username target, got {}", other))),
        };

        let url = self.platform.profile_url(username);
        let status = self.http.head_status(&url, Some(&self.user_agent)).await?;

        if FOUND_STATUSES.contains(&status.as_u16()) {
            info!("Found on {}: {}", self.platform.name, url);
            Ok(single_field(self.platform.name, url))
        } else {
            Err(ProbeError::NotFound(format!(
                "{} answered {} for {}",
                self.platform.name, status, url
            )))
        }
    }
}
