#![allow(clippy::unused_async)]
#![allow(clippy::needless_pass_by_value)]

//! list-pagination CLI
//!
//! Command-line interface for encoding, decoding and composing page tokens

use clap::Parser;
use list_pagination::cli::{Cli, Commands, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Token output owns stdout; logs go to stderr
    let level = match cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
