//! A Rust library for tracing HTTP redirect chains.
//!
//! Given a start URL, the tracer issues one GET request per hop, records the
//! status of every response, resolves each `Location` header itself, and stops
//! at the first response that is not a redirect. Relative redirect targets are
//! anchored to the hop that produced them, and double-encoded `returnUri`
//! parameters are unwrapped along the way.
//!
//! # Logging
//!
//! This library uses the [`log`] crate for logging. You can enable logging by
//! initializing a logger in your application, such as [`env_logger`]. Set the
//! RUST_LOG environment variable to control log levels (e.g., `RUST_LOG=debug`
//! prints every hop).
//!
//! ```
//! // Initialize the logger in your application
//! env_logger::init();
//! ```

/// Module containing the trace data model
pub mod models;

/// Module classifying status codes
pub mod status;

/// Module resolving redirect targets into absolute URLs
pub mod resolve;

/// Module containing the tracer and its configuration
pub mod tracer;

/// Module containing error types
pub mod error;

/// Module validating user-supplied start URLs
pub mod input;

/// Module rendering trace results
pub mod report;

pub use error::{InputError, ResolveError, TraceError};
pub use models::{Hop, TraceOutcome, TraceResult};
pub use tracer::{Tracer, TracerConfig};

/// Traces a single URL with the default configuration
///
/// This is a shortcut for building a [`Tracer`] from
/// [`TracerConfig::default`] and calling [`Tracer::trace`]. Build the tracer
/// once and reuse it when tracing many URLs.
///
/// # Arguments
///
/// * `start_url` - An absolute http(s) URL
///
/// # Returns
///
/// The trace result on success, or the error that aborted the trace
pub async fn trace_url(start_url: &str) -> Result<TraceResult, TraceError> {
    let tracer = Tracer::new(TracerConfig::default())?;
    tracer.trace(start_url).await
}
