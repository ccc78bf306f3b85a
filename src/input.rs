//! Caller-side checks for start URLs.
//!
//! The tracer trusts its input. Front ends run user-supplied URLs through
//! [`validate_target_url`] first.

use crate::error::InputError;
use url::Url;

/// Validates a user-supplied URL before it is traced
///
/// Every `&amp;` is turned back into `&` before parsing. URLs pasted from web
/// pages often carry the escaped form, and the web front end this replaces
/// restored it the same way after HTML-sanitizing its input. No sanitizing
/// happens here since nothing is rendered as HTML, so a URL that really
/// contains the text `&amp;` is rewritten as well.
///
/// # Arguments
///
/// * `raw` - The URL as supplied by the user
/// * `own_host` - Host of the service doing the tracing, if it should not trace itself
///
/// # Returns
///
/// The cleaned URL string, ready to hand to [`crate::tracer::Tracer::trace`]
pub fn validate_target_url(raw: &str, own_host: Option<&str>) -> Result<String, InputError> {
    let cleaned = raw.trim().replace("&amp;", "&");
    let parsed = Url::parse(&cleaned)?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(InputError::UnsupportedScheme(other.to_string())),
    }

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(InputError::MissingHost),
    };

    if let Some(own) = own_host.filter(|own| !own.is_empty()) {
        if host.contains(own) {
            return Err(InputError::SameHost);
        }
    }

    Ok(cleaned)
}
