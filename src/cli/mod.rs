//! CLI module
//!
//! Command-line interface for working with page tokens.
//!
//! # Commands
//!
//! - `encode` - Encode a JSON payload into a token
//! - `decode` - Decode and verify a token
//! - `compose` - Build the token set for a page of records
//! - `validate` - Validate a raw paging request
//! - `serve` - Start HTTP server mode over an in-memory record list

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig};
