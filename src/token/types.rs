//! Token codec types

use crate::types::SigningAlgorithm;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Header `alg` value of an unsigned token
pub const UNSIGNED_ALG: &str = "none";

/// Options for [`encode`](super::encode)
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions<'a> {
    /// Secret to sign with; `None` produces an unsigned token
    pub secret: Option<&'a str>,
    /// Lifetime of the token; embeds `exp = iat + expires_in`
    pub expires_in: Option<Duration>,
    /// Embed an `iat` claim (default: true)
    pub include_issued_at: bool,
    /// HMAC algorithm used when a secret is given
    pub algorithm: SigningAlgorithm,
}

impl Default for EncodeOptions<'_> {
    fn default() -> Self {
        Self {
            secret: None,
            expires_in: None,
            include_issued_at: true,
            algorithm: SigningAlgorithm::default(),
        }
    }
}

impl<'a> EncodeOptions<'a> {
    /// Default options: unsigned, with `iat`, no expiry
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign with the given secret (or leave unsigned with `None`)
    pub fn secret(mut self, secret: Option<&'a str>) -> Self {
        self.secret = secret;
        self
    }

    /// Expire the token after the given duration
    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Do not embed an `iat` claim
    pub fn without_issued_at(mut self) -> Self {
        self.include_issued_at = false;
        self
    }

    /// Sign with a specific HMAC algorithm
    pub fn algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// First segment of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signing algorithm (`none` for unsigned tokens)
    pub alg: String,
    /// Token type, always `JWT` for tokens produced here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl TokenHeader {
    /// Header of an unsigned token
    pub fn unsigned() -> Self {
        Self {
            alg: UNSIGNED_ALG.to_string(),
            typ: Some("JWT".to_string()),
        }
    }

    /// Whether the header announces an unsigned token
    pub fn is_unsigned(&self) -> bool {
        self.alg == UNSIGNED_ALG
    }
}
