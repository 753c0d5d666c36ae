//! Endpoint Negotiator
//!
//! Finds the first base domain of a region that answers at all.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{HttpRequest, HttpTransport};

/// Probe statuses that count as "the server is alive".
///
/// The default accepts 403/404 too: a portal that refuses an anonymous
/// `GET /` is still up, unlike one that times out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityPolicy {
    pub accepted: Vec<u16>,
}

impl ReachabilityPolicy {
    pub fn new(accepted: Vec<u16>) -> Self {
        Self { accepted }
    }

    /// Only 2xx/3xx
    pub fn strict() -> Self {
        Self::new(vec![200, 301, 302])
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.accepted.contains(&status)
    }
}

impl Default for ReachabilityPolicy {
    fn default() -> Self {
        Self::new(vec![200, 301, 302, 403, 404])
    }
}

/// Sequential reachability probe over candidate domains
pub struct EndpointNegotiator {
    transport: Arc<dyn HttpTransport>,
    policy: ReachabilityPolicy,
    probe_timeout: Duration,
}

impl EndpointNegotiator {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        policy: ReachabilityPolicy,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            policy,
            probe_timeout,
        }
    }

    /// Probe one domain
    pub async fn is_reachable(&self, domain: &str) -> bool {
        let url = format!("{}/", domain.trim_end_matches('/'));
        match self
            .transport
            .send(HttpRequest::get(&url, self.probe_timeout))
            .await
        {
            Ok(response) => {
                let alive = self.policy.accepts(response.status);
                if !alive {
                    tracing::debug!(%url, status = response.status, "Probe status not accepted");
                }
                alive
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, timed_out = e.timed_out, "Probe failed");
                false
            }
        }
    }

    /// First reachable candidate in list order
    pub async fn find_reachable_domain(&self, candidates: &[String]) -> Option<String> {
        for domain in candidates {
            tracing::info!("🔗 Probing {}", domain);
            if self.is_reachable(domain).await {
                tracing::info!("✅ Reachable: {}", domain);
                return Some(domain.trim_end_matches('/').to_string());
            }
            tracing::warn!("❌ Unreachable: {}", domain);
        }
        None
    }
}
