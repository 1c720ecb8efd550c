//! Token codec
//!
//! Encodes a JSON-object payload into a compact three-segment string
//! (`header.payload.signature`, JWT compact layout) and decodes it back.
//!
//! # Overview
//!
//! - Without a secret the token is unsigned: the header carries `alg: none`
//!   and the signature segment is empty, so it still has three segments.
//! - With a secret the token is HMAC-signed through `jsonwebtoken`.
//! - `iat` is embedded unless the caller opts out; `exp` is embedded whenever
//!   an expiry is requested and checked on every decode.
//!
//! The codec knows nothing about pagination and never keeps a secret beyond
//! the call that received it.

mod codec;
mod types;

pub use codec::{decode, encode, parse_duration};
pub use types::{EncodeOptions, TokenHeader};
