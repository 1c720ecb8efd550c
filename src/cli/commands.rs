//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cursor pagination token toolkit
#[derive(Parser, Debug)]
#[command(name = "list-pagination")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pagination config file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Secret for signing and verifying tokens (overrides the config file)
    #[arg(short, long, global = true)]
    pub secret: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a JSON object into a token
    Encode {
        /// Payload JSON object
        #[arg(long)]
        payload: String,

        /// Token lifetime, e.g. 90s, 15m, 1h, 7d
        #[arg(long)]
        expires_in: Option<String>,

        /// Leave out the issued-at timestamp
        #[arg(long)]
        no_timestamp: bool,

        /// HMAC algorithm for signed tokens (HS256, HS384, HS512)
        #[arg(long)]
        algorithm: Option<String>,
    },

    /// Decode and verify a token
    Decode {
        /// Token to decode
        token: String,
    },

    /// Compose the self/first/next/prev tokens for a page of records
    Compose {
        /// Raw request JSON, e.g. {"limit": 3} or {"page": "<token>"}
        #[arg(long, default_value = "{}")]
        query: String,

        /// Fetched records as a JSON array
        #[arg(long)]
        page: String,

        /// Record field holding the unique identifier (overrides the config file)
        #[arg(long)]
        uuid_key: Option<String>,
    },

    /// Validate a raw request
    Validate {
        /// Raw request JSON
        #[arg(long, conflicts_with = "query")]
        request: Option<String>,

        /// Raw request as a URL query string, e.g. "limit=3&sort=-name"
        #[arg(long)]
        query: Option<String>,
    },

    /// Serve an in-memory record list with cursor pagination
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// JSON file holding an array of records (default: generated sample)
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
