//! reqwest-backed link prober
//!
//! Probes never fail as a whole: a request error becomes a
//! [`ProbeOutcome::Failed`] that the checks report against the URL.

use futures::stream::{self, StreamExt};
use sitecheck_core::{ProbeConfig, Result, SiteCheckError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// What a single GET produced
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Response headers arrived
    Response { status: u16, elapsed: Duration },
    /// Connection, TLS, timeout or redirect failure
    Failed { error: String },
}

/// Result of probing one URL
#[derive(Debug, Clone, PartialEq)]
pub struct LinkProbe {
    pub url: String,
    pub outcome: ProbeOutcome,
}

impl LinkProbe {
    pub fn status(&self) -> Option<u16> {
        match self.outcome {
            ProbeOutcome::Response { status, .. } => Some(status),
            ProbeOutcome::Failed { .. } => None,
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match self.outcome {
            ProbeOutcome::Response { elapsed, .. } => Some(elapsed),
            ProbeOutcome::Failed { .. } => None,
        }
    }
}

/// HTTP client for link checks
#[derive(Debug, Clone)]
pub struct LinkProber {
    client: reqwest::Client,
    config: ProbeConfig,
}

impl LinkProber {
    /// Create a prober sending the configured User-Agent with the configured timeout
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SiteCheckError::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// GET a single URL and time it until the response headers arrive.
    ///
    /// Redirects are followed, so `elapsed` spans every hop, not just the final response.
    pub async fn probe(&self, url: &str) -> LinkProbe {
        info!("Checking link: {}", url);

        let started = Instant::now();
        let outcome = match self.client.get(url).send().await {
            Ok(response) => {
                let elapsed = started.elapsed();
                let status = response.status().as_u16();
                debug!("{} -> {} in {:?}", url, status, elapsed);
                ProbeOutcome::Response { status, elapsed }
            }
            Err(e) => {
                error!("Request failed for link: {}, Error: {}", url, e);
                ProbeOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        LinkProbe {
            url: url.to_string(),
            outcome,
        }
    }

    /// Probe every URL with at most `concurrency` requests in flight.
    ///
    /// Results follow the input order.
    pub async fn probe_all<I, S>(&self, urls: I, concurrency: usize) -> Vec<LinkProbe>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls.into_iter().map(|u| u.as_ref().to_string()).collect();
        info!(
            "Probing {} links ({} at a time)",
            urls.len(),
            concurrency.max(1)
        );

        stream::iter(urls.iter())
            .map(|url| self.probe(url))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prober_builds_with_defaults() {
        let prober = LinkProber::new(ProbeConfig::default()).unwrap();
        assert_eq!(prober.config().request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_probe_accessors() {
        let ok = LinkProbe {
            url: "https://example.com/".to_string(),
            outcome: ProbeOutcome::Response {
                status: 200,
                elapsed: Duration::from_millis(120),
            },
        };
        assert_eq!(ok.status(), Some(200));
        assert_eq!(ok.elapsed(), Some(Duration::from_millis(120)));

        let failed = LinkProbe {
            url: "https://example.invalid/".to_string(),
            outcome: ProbeOutcome::Failed {
                error: "dns error".to_string(),
            },
        };
        assert_eq!(failed.status(), None);
        assert_eq!(failed.elapsed(), None);
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_failed_probe() {
        let prober = LinkProber::new(ProbeConfig::default()).unwrap();
        let probe = prober.probe("not a url").await;
        assert!(matches!(probe.outcome, ProbeOutcome::Failed { .. }));
    }
}
