//! Binary crate for the `cityweather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive prompts (API key, city name)
//! - Logging setup and terminal output

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod prompt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cmd = cli::Cli::parse();
    match cmd.run().await {
        Err(e) if prompt::is_cancelled(&e) => {
            println!();
            Ok(())
        }
        other => other,
    }
}

/// Logs go to stderr so the weather table on stdout stays clean. `RUST_LOG` overrides.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
