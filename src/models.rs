//! Data structures describing a redirect trace.
//!
//! A trace is an ordered list of [`Hop`]s plus the flags describing how it
//! ended. These types are plain values: a [`TraceResult`] is produced once
//! per call to the tracer and nothing else holds on to it.

use crate::status::status_class;
use serde::{Deserialize, Serialize};

/// One request/response pair recorded during a trace
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Hop {
    /// 1-based sequence number within the trace
    pub number: usize,
    /// The absolute URL that was requested
    pub url: String,
    /// HTTP status code of the response
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Hundreds class of the status code ("2xx".."5xx"), empty if out of range
    #[serde(rename = "statusCodeClass")]
    pub status_code_class: String,
}

impl Hop {
    /// Creates a hop, deriving the status class from the code
    pub fn new(number: usize, url: impl Into<String>, status_code: u16) -> Self {
        Self {
            number,
            url: url.into(),
            status_code,
            status_code_class: status_class(status_code).to_string(),
        }
    }
}

/// How a trace ended, for callers that render each case differently
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceOutcome {
    /// At least one hop was recorded and the chain reached a non-redirect
    Completed,
    /// A redirect arrived without a `Location` header
    MissingLocation,
    /// The response headers did not arrive in time
    TimedOut,
}

/// The result of tracing one start URL
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TraceResult {
    /// URL of the terminal response; empty unless the trace completed
    #[serde(rename = "finalUrl")]
    pub final_url: String,
    /// Hops in request order
    pub hops: Vec<Hop>,
    /// Whether the trace stopped on a response-header timeout
    #[serde(rename = "timedOut")]
    pub timed_out: bool,
    /// Whether a location-less redirect came from a known edge proxy
    #[serde(rename = "proxySignature")]
    pub proxy_signature: bool,
}

impl TraceResult {
    /// A chain that ended on a non-redirect response
    pub fn completed(final_url: impl Into<String>, hops: Vec<Hop>) -> Self {
        Self {
            final_url: final_url.into(),
            hops,
            ..Self::default()
        }
    }

    /// A redirect without a `Location` header
    ///
    /// Hops gathered before this point are not kept, so callers see an empty
    /// list and can tell this case apart from a completed chain.
    pub fn missing_location(proxy_signature: bool) -> Self {
        Self {
            proxy_signature,
            ..Self::default()
        }
    }

    /// A request that ran out of time waiting for headers
    pub fn timed_out() -> Self {
        Self {
            timed_out: true,
            ..Self::default()
        }
    }

    /// Classifies this result into one of the terminal outcomes
    pub fn outcome(&self) -> TraceOutcome {
        if self.timed_out {
            TraceOutcome::TimedOut
        } else if self.hops.is_empty() {
            TraceOutcome::MissingLocation
        } else {
            TraceOutcome::Completed
        }
    }

    /// The last recorded hop, if any
    pub fn last_hop(&self) -> Option<&Hop> {
        self.hops.last()
    }
}
