//! Status-code classification.

/// Returns the hundreds class of a status code
///
/// Codes outside `[200, 600)` map to an empty string rather than an error.
///
/// # Arguments
///
/// * `code` - The HTTP status code
///
/// # Returns
///
/// One of `"2xx"`, `"3xx"`, `"4xx"`, `"5xx"` or `""`
pub fn status_class(code: u16) -> &'static str {
    match code {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "",
    }
}

/// Whether the tracer treats this status as a redirect to follow
pub fn is_redirect(code: u16) -> bool {
    (300..=399).contains(&code)
}
