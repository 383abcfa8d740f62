//! Diagnostic output for the command-line tool.

use std::env;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a crate-specific filter directive.
pub const LOG_ENV: &str = "TGTEXT_LOG";

/// Filter from `TGTEXT_LOG`, then `RUST_LOG`, then the verbosity flag.
fn create_filter(verbose: bool) -> EnvFilter {
    if let Ok(level) = env::var(LOG_ENV)
        && !level.trim().is_empty()
    {
        return EnvFilter::new(expand_level(&level));
    }
    if let Ok(directive) = env::var("RUST_LOG")
        && !directive.trim().is_empty()
    {
        return EnvFilter::new(directive);
    }
    EnvFilter::new(default_directive(verbose))
}

/// A bare level such as `debug` applies to this crate only; anything with
/// module syntax is used as written.
fn expand_level(level: &str) -> String {
    if level.contains(['=', ':', ',']) {
        level.to_string()
    } else {
        format!("warn,tgtext={level}")
    }
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Send log events to stderr.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(create_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
