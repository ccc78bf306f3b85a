//! Rendering of trace results for the command line.

use crate::models::{Hop, TraceOutcome, TraceResult};
use serde::Serialize;
use std::fmt::Write;

/// Status reported for the placeholder hop of a location-less redirect
pub const MISSING_LOCATION_STATUS: u16 = 500;

/// Message shown when a redirect carried no `Location` header
pub const MISSING_LOCATION_MESSAGE: &str = "Redirect Location Not Provided By Headers";

/// Message shown when a trace timed out
pub const TIMEOUT_MESSAGE: &str = "Timed out waiting for response headers";

/// Renders a trace result as a plain-text table
///
/// A location-less redirect is shown as a single placeholder hop for the
/// start URL with status 500, followed by an explanatory message.
///
/// # Arguments
///
/// * `start_url` - The URL the trace started from
/// * `result` - The result to render
pub fn render_text(start_url: &str, result: &TraceResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trace: {}", start_url);

    match result.outcome() {
        TraceOutcome::TimedOut => {
            let _ = writeln!(out, "{}", TIMEOUT_MESSAGE);
        }
        TraceOutcome::MissingLocation => {
            let placeholder = Hop::new(1, start_url, MISSING_LOCATION_STATUS);
            write_hops(&mut out, std::slice::from_ref(&placeholder));
            let _ = writeln!(out, "{}", MISSING_LOCATION_MESSAGE);
            if result.proxy_signature {
                let _ = writeln!(
                    out,
                    "The response came from a reverse-proxy edge, which may have intercepted the request"
                );
            }
        }
        TraceOutcome::Completed => {
            write_hops(&mut out, &result.hops);
            let _ = writeln!(out, "Final URL: {}", result.final_url);
        }
    }

    out
}

fn write_hops(out: &mut String, hops: &[Hop]) {
    let _ = writeln!(out, "{:>3}  {:>6}  {:<5}  URL", "#", "Status", "Class");
    for hop in hops {
        let _ = writeln!(
            out,
            "{:>3}  {:>6}  {:<5}  {}",
            hop.number, hop.status_code, hop.status_code_class, hop.url
        );
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(rename = "startUrl")]
    start_url: &'a str,
    outcome: TraceOutcome,
    #[serde(flatten)]
    result: &'a TraceResult,
}

/// Renders a trace result as pretty-printed JSON
///
/// The object carries the start URL, the outcome and every field of the
/// [`TraceResult`].
pub fn render_json(start_url: &str, result: &TraceResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        start_url,
        outcome: result.outcome(),
        result,
    })
}
