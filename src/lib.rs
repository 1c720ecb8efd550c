// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # list-pagination
//!
//! Cursor-based pagination tokens for list endpoints.
//!
//! A list response carries opaque `self`, `first`, `next` and `prev` tokens.
//! Each token is a JWT-shaped string whose payload holds the paging state
//! (`limit`, `sort`, `filter`, `type`, `cursors`), optionally HMAC-signed and
//! time-limited. A client pages by sending a token back as `page`.
//!
//! ## Features
//!
//! - **Token Codec**: Unsigned (`alg: none`) or HS256/384/512 signed tokens with `iat`/`exp`
//! - **Cursor Chain**: Stack of record identifiers so both `next` and `prev` work
//! - **Request Schema**: `count` / `page` / plain `limit`+`sort`+`filter` validation
//!   with typed, field-addressed errors
//! - **HTTP Glue**: axum extractor, token composition and RFC 5988 `Link` headers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use list_pagination::cursor::ComposeOptions;
//! use list_pagination::schema::{PageRequest, SchemaConfig};
//! use list_pagination::{compose_tokens, validate_request};
//!
//! let config = SchemaConfig::new().max(50).secret("s3cret");
//! let request = validate_request(&raw_query, &config)?;
//!
//! if let PageRequest::List(params) = &request {
//!     let page = fetch(params)?;
//!     let options = ComposeOptions::new().secret("s3cret");
//!     let tokens = compose_tokens(params, &page, &options)?;
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   raw request ── schema::validate ──► PageRequest            │
//! │                        │ page token                          │
//! │                        ▼                                     │
//! │                 cursor::decompose ◄── token::decode          │
//! │                                                              │
//! │   fetched page ── cursor::compose ──► TokenSet               │
//! │                        │                                     │
//! │                        ▼                                     │
//! │                 token::encode ──► self/first/next/prev       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for list-pagination
pub mod error;

/// Common types and type aliases
pub mod types;

/// Token encoding and decoding
pub mod token;

/// Cursor chain and token set composition
pub mod cursor;

/// Request validation
pub mod schema;

/// Axum extractor, tokenize step and Link headers
pub mod http;

/// Schema configuration loading
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used operations
pub use config::{load_config, load_config_from_str};
pub use cursor::{compose as compose_tokens, decompose as decompose_token};
pub use schema::validate_request;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
