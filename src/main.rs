//! Command-line front end for the hoptrace library.
//! See the lib.rs file for the actual functionality.

use clap::Parser;
use hoptrace::input::validate_target_url;
use hoptrace::report::{render_json, render_text};
use hoptrace::tracer::{DEFAULT_MAX_HOPS, DEFAULT_USER_AGENT};
use hoptrace::{Tracer, TracerConfig};
use log::error;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hoptrace")]
#[command(about = "Trace HTTP redirect chains one hop at a time", long_about = None)]
struct Cli {
    /// Absolute http(s) URLs to trace
    #[arg(required = true)]
    urls: Vec<String>,

    /// Seconds to wait for each response's headers
    #[arg(long, env = "HOPTRACE_TIMEOUT_SECS", default_value_t = 5)]
    timeout_secs: u64,

    /// Maximum number of requests per trace
    #[arg(
        long,
        env = "HOPTRACE_MAX_HOPS",
        default_value_t = DEFAULT_MAX_HOPS as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    max_hops: u64,

    /// User-Agent header to send
    #[arg(long, env = "HOPTRACE_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Refuse to trace URLs whose host contains this value
    #[arg(long, env = "HOPTRACE_EXCLUDE_HOST")]
    exclude_host: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG environment variable to control log levels (e.g., RUST_LOG=debug)
    env_logger::init();

    let cli = Cli::parse();

    let tracer = Tracer::new(TracerConfig {
        header_timeout: Duration::from_secs(cli.timeout_secs),
        max_hops: cli.max_hops as usize,
        user_agent: cli.user_agent,
    })?;

    let mut failed = false;
    let mut targets = Vec::with_capacity(cli.urls.len());
    for raw in &cli.urls {
        match validate_target_url(raw, cli.exclude_host.as_deref()) {
            Ok(url) => targets.push(url),
            Err(e) => {
                eprintln!("{}: {}", raw, e);
                failed = true;
            }
        }
    }

    let results = tracer.trace_all(&targets).await;
    for (url, result) in targets.iter().zip(results) {
        match result {
            Ok(trace) if cli.json => println!("{}", render_json(url, &trace)?),
            Ok(trace) => println!("{}", render_text(url, &trace)),
            Err(e) => {
                error!("Trace of {} failed: {}", url, e);
                eprintln!("Error following redirects for {}: {}", url, e);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
