//! Redirect target resolution.
//!
//! Turns the raw value of a `Location` header into the absolute URL of the
//! next hop. Relative targets borrow the scheme and authority of the URL that
//! produced the redirect, and a `returnUri` query parameter is unwrapped so
//! that origins which double-encode it do not send the tracer in circles.

use crate::error::ResolveError;
use log::debug;
use percent_encoding::percent_decode_str;
use url::{ParseError, Url};

/// Name of the query parameter that gets unwrapped after resolution
pub const RETURN_URI_PARAM: &str = "returnUri";

/// Resolves a `Location` header value into an absolute URL
///
/// Absolute locations are returned in normalized form. Relative locations,
/// including scheme-less `//host/path` ones, take the scheme, host and port
/// of `previous`; the reference's own path, query and fragment are kept and
/// treated as rooted at `/`.
///
/// # Arguments
///
/// * `previous` - The URL of the hop that answered with the redirect, if any
/// * `location` - The raw `Location` header value
///
/// # Returns
///
/// The absolute URL as a string, or an error when the location cannot be
/// parsed or is relative with nothing to anchor it to
pub fn resolve_redirect(previous: Option<&Url>, location: &str) -> Result<String, ResolveError> {
    match Url::parse(location) {
        Ok(absolute) => Ok(absolute.to_string()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            // A relative reference never carries a scheme of its own, so
            // without a previous hop there is nothing left to borrow from.
            let previous =
                previous.ok_or_else(|| ResolveError::MissingBase(location.to_string()))?;
            let root = origin_root(previous);

            let reference = if location.starts_with('/') {
                location.to_string()
            } else {
                format!("/{}", location)
            };

            let parse_error = |source| ResolveError::Parse {
                location: location.to_string(),
                source,
            };
            let mut resolved = root.join(&reference).map_err(parse_error)?;

            // Network-path references (`//host/x`) bring their own authority;
            // only the path, query and fragment are kept from them.
            resolved.set_host(root.host_str()).map_err(parse_error)?;
            let _ = resolved.set_port(root.port());
            let _ = resolved.set_username("");
            let _ = resolved.set_password(None);

            Ok(resolved.to_string())
        }
        Err(source) => Err(ResolveError::Parse {
            location: location.to_string(),
            source,
        }),
    }
}

/// Strips everything but scheme, host and port from a URL
fn origin_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    // Only fails for cannot-be-a-base URLs, which have no credentials anyway
    let _ = root.set_username("");
    let _ = root.set_password(None);
    root
}

/// Unwraps a double-encoded `returnUri` query parameter
///
/// When the URL carries a non-empty `returnUri`, its value is percent-decoded
/// once more (a `%` without two hex digits after it is an error), any
/// remaining `%3A` and `%2F` sequences are restored to `:` and `/`, and the
/// URL is rebuilt as `scheme://host/path?returnUri=<value>`. All other query
/// parameters and the fragment are dropped in that case.
/// URLs without the parameter are returned unchanged.
///
/// # Arguments
///
/// * `resolved` - An absolute URL, typically from [`resolve_redirect`]
///
/// # Returns
///
/// The possibly rewritten URL
pub fn rewrite_return_uri(resolved: &str) -> Result<String, ResolveError> {
    let url = Url::parse(resolved).map_err(|source| ResolveError::Parse {
        location: resolved.to_string(),
        source,
    })?;

    let raw = match url
        .query_pairs()
        .find(|(key, _)| key == RETURN_URI_PARAM)
    {
        Some((_, value)) if !value.is_empty() => value.into_owned(),
        _ => return Ok(resolved.to_string()),
    };

    if !has_valid_escapes(&raw) {
        return Err(ResolveError::ReturnUri(raw));
    }

    let decoded = percent_decode_str(&raw)
        .decode_utf8()
        .map_err(|_| ResolveError::ReturnUri(raw.clone()))?
        .replace("%3A", ":")
        .replace("%2F", "/");

    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    let rebuilt = format!(
        "{}://{}{}{}?{}={}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        port,
        url.path(),
        RETURN_URI_PARAM,
        decoded
    );

    debug!("Rewrote {} to {}", resolved, rebuilt);
    Ok(rebuilt)
}

/// Whether every `%` in `value` starts a two-hex-digit escape
fn has_valid_escapes(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

/// Computes the next hop URL from a redirect's `Location` header
///
/// This is [`resolve_redirect`] followed by [`rewrite_return_uri`].
pub fn next_hop_url(previous: Option<&Url>, location: &str) -> Result<String, ResolveError> {
    let resolved = resolve_redirect(previous, location)?;
    rewrite_return_uri(&resolved)
}
