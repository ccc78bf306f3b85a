//! The redirect tracer.
//!
//! [`Tracer`] issues one GET per hop and decides for itself whether to keep
//! going. The underlying client hands every redirect response back instead
//! of following it, so each `Location` header passes through
//! [`crate::resolve::next_hop_url`] before the next request is made.

use crate::error::TraceError;
use crate::models::{Hop, TraceResult};
use crate::resolve::next_hop_url;
use crate::status::is_redirect;
use futures::future::join_all;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, LOCATION, SERVER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Browser User-Agent sent with every request; some sites refuse requests without one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// `Server` header fragment that identifies a reverse-proxy edge
pub const PROXY_SIGNATURE: &str = "cloudflare";

/// Default wait for response headers
pub const DEFAULT_HEADER_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on the number of requests in one trace
pub const DEFAULT_MAX_HOPS: usize = 20;

/// Configuration for a [`Tracer`]
#[derive(Debug, Clone)]
pub struct TracerConfig {
    /// How long to wait for each response's headers
    pub header_timeout: Duration,
    /// Maximum number of requests in one trace before it counts as a loop
    pub max_hops: usize,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            header_timeout: DEFAULT_HEADER_TIMEOUT,
            max_hops: DEFAULT_MAX_HOPS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Follows redirect chains one hop at a time
///
/// A `Tracer` holds no per-trace state, so a single instance can run any
/// number of traces concurrently.
#[derive(Debug, Clone)]
pub struct Tracer {
    client: Client,
    config: TracerConfig,
}

impl Tracer {
    /// Creates a tracer and its HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - Timeout, hop bound and User-Agent to use
    ///
    /// # Returns
    ///
    /// The tracer, or [`TraceError::Client`] if the client cannot be built
    pub fn new(config: TracerConfig) -> Result<Self, TraceError> {
        let client = build_client(&config).map_err(TraceError::Client)?;
        Ok(Self { client, config })
    }

    /// The configuration this tracer was built with
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Traces the redirect chain starting at `start_url`
    ///
    /// The loop ends on the first non-redirect response, on a redirect without
    /// a `Location` header, on a response-header timeout, or on an error.
    /// Timeouts and missing locations are reported through the returned
    /// [`TraceResult`]; everything else that stops the chain early is an
    /// error, and the hops gathered up to that point are dropped.
    ///
    /// # Arguments
    ///
    /// * `start_url` - An absolute http(s) URL; validating it is up to the caller
    ///
    /// # Returns
    ///
    /// The trace result, or the error that aborted the trace
    pub async fn trace(&self, start_url: &str) -> Result<TraceResult, TraceError> {
        let mut hops: Vec<Hop> = Vec::new();
        let mut current = start_url.to_string();
        let mut number: usize = 1;

        loop {
            // 1. Refuse to issue more requests than the hop bound allows
            if number > self.config.max_hops {
                warn!(
                    "Giving up on {} after {} hops",
                    start_url, self.config.max_hops
                );
                return Err(TraceError::RedirectLoop {
                    max_hops: self.config.max_hops,
                });
            }

            // 2. Build and send the request for the current hop
            let url = Url::parse(&current).map_err(|source| TraceError::InvalidUrl {
                url: current.clone(),
                source,
            })?;

            let response = match self
                .client
                .get(url.clone())
                .header(USER_AGENT, self.config.user_agent.as_str())
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) if err.is_timeout() => {
                    warn!("Timed out waiting for headers from {}", current);
                    return Ok(TraceResult::timed_out());
                }
                Err(source) => {
                    return Err(TraceError::Request {
                        url: current,
                        source,
                    })
                }
            };

            // 3. Record the hop
            let status = response.status().as_u16();
            let hop = Hop::new(number, current.as_str(), status);
            debug!(
                "Hop {}: {} -> {} ({})",
                hop.number, hop.url, hop.status_code, hop.status_code_class
            );
            hops.push(hop);

            // 4. Anything but a redirect ends the chain
            if !is_redirect(status) {
                info!(
                    "Trace of {} finished at {} after {} hops",
                    start_url,
                    current,
                    hops.len()
                );
                return Ok(TraceResult::completed(current, hops));
            }

            // 5. A redirect without a Location header ends it too
            let location = match location_header(response.headers()) {
                Some(location) => location,
                None => {
                    let proxy_signature = has_proxy_signature(response.headers());
                    warn!(
                        "Redirect status {} for {} but no Location header (proxy signature: {})",
                        status, current, proxy_signature
                    );
                    return Ok(TraceResult::missing_location(proxy_signature));
                }
            };

            // 6. Resolve the target against this hop and move on
            current = next_hop_url(Some(&url), &location)?;
            number += 1;
        }
    }

    /// Traces several start URLs concurrently
    ///
    /// Results come back in the same order as `start_urls`.
    pub async fn trace_all<S: AsRef<str>>(
        &self,
        start_urls: &[S],
    ) -> Vec<Result<TraceResult, TraceError>> {
        join_all(start_urls.iter().map(|url| self.trace(url.as_ref()))).await
    }
}

/// Builds the HTTP client used for tracing
///
/// The timeout bounds the wait for response headers: the tracer never reads
/// a response body, so nothing else is left for it to cover.
fn build_client(config: &TracerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.header_timeout)
        .redirect(single_hop_policy())
        .build()
}

/// Redirect policy that hands the first redirect back to the caller
///
/// `previous()` already holds the original request URL when the first
/// redirect is checked, so this behaves like `Policy::none()`.
fn single_hop_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().is_empty() {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

/// Reads a non-empty `Location` header
fn location_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LOCATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .filter(|location| !location.is_empty())
}

/// Whether the `Server` header marks a reverse-proxy edge (case-insensitive)
fn has_proxy_signature(headers: &HeaderMap) -> bool {
    headers
        .get(SERVER)
        .and_then(|value| value.to_str().ok())
        .map(|server| server.to_ascii_lowercase().contains(PROXY_SIGNATURE))
        .unwrap_or(false)
}
