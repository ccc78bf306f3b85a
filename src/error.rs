//! Error types for redirect tracing.
//!
//! A response-header timeout is deliberately absent here: it is reported
//! through [`crate::models::TraceResult::timed_out`] rather than as an error.

/// Error type for resolving a `Location` header into the next hop URL
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid redirect location '{location}': {source}")]
    Parse {
        location: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Relative redirect location '{0}' has no URL to resolve against")]
    MissingBase(String),
    #[error("Malformed returnUri value '{0}'")]
    ReturnUri(String),
}

/// Error type for a single trace
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The HTTP client could not be built
    #[error("HTTP client initialization error: {0}")]
    Client(#[source] reqwest::Error),

    /// The URL to request could not be parsed
    #[error("Error creating request for '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The request failed for a reason other than a timeout
    #[error("Error accessing URL '{url}': {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A redirect target could not be turned into the next hop
    #[error("Error handling redirect: {0}")]
    Resolve(#[from] ResolveError),

    /// The chain kept redirecting past the configured bound
    #[error("Redirect chain exceeded {max_hops} hops")]
    RedirectLoop { max_hops: usize },
}

/// Error type for caller-side validation of a start URL
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid URL format: {0}")]
    Parse(#[from] url::ParseError),
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("Redirecting to URLs within the same server is not allowed")]
    SameHost,
}
