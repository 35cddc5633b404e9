// src/probes/ip.rs
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use super::{endpoint, endpoint_with_query, HttpJsonProbe, ProbeContext};
use crate::engine::{single_field, Fields, Probe};
use crate::error::{ProbeError, ProbeResult};
use crate::target::Target;

/// IP trace probes: geolocation, ASN, abuse reports, reverse DNS, open ports
pub fn probes(ctx: &ProbeContext) -> Vec<Arc<dyn Probe>> {
    let services = &ctx.config.services;

    let ipinfo = services.ipinfo.clone();
    let geolocation = HttpJsonProbe::new("geolocation", ctx.http.clone(), move |target| {
        endpoint(&ipinfo, &[ip_of(target)?.to_string().as_str(), "json"])
    })
    .describe("City, region and organisation for the address");

    let asn = services.asn.clone();
    let asn_info = HttpJsonProbe::new("asn_info", ctx.http.clone(), move |target| {
        endpoint_with_query(&asn, &[("ip", ip_of(target)?.to_string().as_str()), ("format", "json")])
    })
    .describe("Autonomous system announcing the address");

    let abuseipdb = services.abuseipdb.clone();
    let abuse_report = HttpJsonProbe::new("abuse_report", ctx.http.clone(), move |target| {
        endpoint_with_query(
            &abuseipdb,
            &[("ipAddress", ip_of(target)?.to_string().as_str()), ("maxAgeInDays", "90")],
        )
    })
    .describe("AbuseIPDB confidence score and usage type")
    .extract("/data")
    .credential("Key", ctx.config.credentials.abuseipdb_key.as_deref(), "credentials.abuseipdb_key");

    let ports = PortScanProbe::new(
        ctx.config.ports.tcp.clone(),
        Duration::from_millis(ctx.config.ports.connect_timeout_ms),
    );

    vec![
        Arc::new(geolocation) as Arc<dyn Probe>,
        Arc::new(asn_info),
        Arc::new(abuse_report),
        Arc::new(ReverseDnsProbe::new(Arc::clone(&ctx.resolver))),
        Arc::new(ports),
    ]
}

fn ip_of(target: &Target) -> ProbeResult<IpAddr> {
    target
        .ip()
        .ok_or_else(|| ProbeError::Parse(format!("expected an IP target, got {}", target)))
}

/// PTR lookup for the address
pub struct ReverseDnsProbe {
    resolver: Arc<TokioAsyncResolver>,
}

impl ReverseDnsProbe {
    pub fn new(resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Probe for ReverseDnsProbe {
    fn name(&self) -> &str {
        "dns_reverse"
    }

    fn description(&self) -> &str {
        "Hostnames the address resolves back to"
    }

    async fn run(&self, target: &Target) -> ProbeResult<Fields> {
        let ip = ip_of(target)?;
        let lookup = self.resolver.reverse_lookup(ip).await?;

        let hostnames: Vec<String> = lookup
            .iter()
            .map(|ptr| ptr.to_string().trim_end_matches('.').to_string())
            .collect();

        let hostname = hostnames
            .first()
            .cloned()
            .ok_or_else(|| ProbeError::NotFound(format!("no PTR record for {}", ip)))?;

        Ok(single_field(
            "dns_reverse",
            json!({ "hostname": hostname, "hostnames": hostnames }),
        ))
    }
}

/// TCP connect check against a fixed list of ports
pub struct PortScanProbe {
    ports: Vec<u16>,
    connect_timeout: Duration,
}

impl PortScanProbe {
    pub fn new(ports: Vec<u16>, connect_timeout: Duration) -> Self {
        Self { ports, connect_timeout }
    }

    async fn is_open(addr: SocketAddr, connect_timeout: Duration) -> bool {
        // The stream is dropped, and the socket closed, on every path
        match tokio::time::timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                trace!("{} closed: {}", addr, e);
                false
            }
            Err(_) => false,
        }
    }
}

#[async_trait]
impl Probe for PortScanProbe {
    fn name(&self) -> &str {
        "open_ports"
    }

    fn description(&self) -> &str {
        "Common TCP ports accepting connections"
    }

    async fn run(&self, target: &Target) -> ProbeResult<Fields> {
        let ip = ip_of(target)?;
        let mut scans = JoinSet::new();

        for &port in &self.ports {
            let connect_timeout = self.connect_timeout;
            scans.spawn(async move {
                let open = Self::is_open(SocketAddr::new(ip, port), connect_timeout).await;
                (port, open)
            });
        }

        let mut open_ports = Vec::new();
        while let Some(joined) = scans.join_next().await {
            match joined {
                Ok((port, true)) => open_ports.push(port),
                Ok(_) => {}
                Err(e) => debug!("Port check task failed: {}", e),
            }
        }
        open_ports.sort_unstable();

        Ok(single_field("open_ports", json!(open_ports)))
    }
}
