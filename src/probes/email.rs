// src/probes/email.rs
use std::sync::Arc;

use async_trait::async_trait;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use serde_json::json;
use tracing::debug;

use super::{endpoint, HttpJsonProbe, ProbeContext};
use crate::engine::{single_field, Fields, Probe};
use crate::error::{ProbeError, ProbeResult};
use crate::target::Target;

/// Email probes: breach history, reputation, MX verification, enrichment
pub fn probes(ctx: &ProbeContext) -> Vec<Arc<dyn Probe>> {
    let services = &ctx.config.services;
    let credentials = &ctx.config.credentials;

    let hibp = services.haveibeenpwned.clone();
    let breaches = HttpJsonProbe::new("breaches", ctx.http.clone(), move |target| {
        endpoint(&hibp, &[email_of(target)?.as_str()])
    })
    .describe("Known breaches containing the address")
    .not_found_as(json!([]));
    let breaches = match credentials.haveibeenpwned_key.as_deref() {
        Some(key) => breaches.header("hibp-api-key", key),
        None => breaches,
    };

    let emailrep = services.emailrep.clone();
    let reputation = HttpJsonProbe::new("reputation", ctx.http.clone(), move |target| {
        endpoint(&emailrep, &[email_of(target)?.as_str()])
    })
    .describe("Address reputation score");

    let clearbit = services.clearbit.clone();
    let bearer = credentials.clearbit_key.as_ref().map(|key| format!("Bearer {}", key));
    let enrichment = HttpJsonProbe::new("enrichment", ctx.http.clone(), move |target| {
        endpoint(&clearbit, &[email_of(target)?.as_str()])
    })
    .describe("Person enrichment for the address")
    .credential("Authorization", bearer.as_deref(), "credentials.clearbit_key");

    vec![
        Arc::new(breaches) as Arc<dyn Probe>,
        Arc::new(reputation),
        Arc::new(MxVerificationProbe::new(Arc::clone(&ctx.resolver))),
        Arc::new(enrichment),
    ]
}

fn email_of(target: &Target) -> ProbeResult<String> {
    match target {
        Target::Email(email) => Ok(email.clone()),
        other => Err(ProbeError::Parse(format!("expected an email target, got {}", other))),
    }
}

/// Checks whether the address's domain accepts mail
pub struct MxVerificationProbe {
    resolver: Arc<TokioAsyncResolver>,
}

impl MxVerificationProbe {
    pub fn new(resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Probe for MxVerificationProbe {
    fn name(&self) -> &str {
        "verification"
    }

    fn description(&self) -> &str {
        "MX records for the address's domain"
    }

    async fn run(&self, target: &Target) -> ProbeResult<Fields> {
        let domain = target
            .email_domain()
            .ok_or_else(|| ProbeError::Parse(format!("no domain in {}", target)))?;

        let exchanges: Vec<String> = match self.resolver.mx_lookup(domain).await {
            Ok(lookup) => {
                let mut records: Vec<(u16, String)> = lookup
                    .iter()
                    .map(|mx| (mx.preference(), mx.exchange().to_string().trim_end_matches('.').to_string()))
                    .collect();
                records.sort();
                records.into_iter().map(|(_, host)| host).collect()
            }
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                debug!("No MX records for {}", domain);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let deliverable = !exchanges.is_empty();
        Ok(single_field(
            "verification",
            json!({
                "domain": domain,
                "mx_records": exchanges,
                "deliverable": deliverable,
            }),
        ))
    }
}
