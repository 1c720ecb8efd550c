//! Error types for list-pagination
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Token failures live in [`DecodeError`], request validation failures in
//! [`ValidationError`]. Both carry enough detail to tell a client exactly which
//! field (and which array position) broke which rule.

use std::fmt;
use thiserror::Error;

/// The main error type for list-pagination
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Token Errors
    // ============================================================================
    /// A payload could not be turned into a token
    #[error("Encoding failed: {message}")]
    Encoding {
        /// What went wrong
        message: String,
    },

    /// A token could not be decoded or verified
    #[error("Decoding failed: {0}")]
    Decoding(#[from] DecodeError),

    /// The token sent in a request field could not be decoded or verified
    #[error("Decoding failed: \"{field}\" {source}")]
    PageToken {
        /// Request field holding the token, e.g. `page`
        field: String,
        /// Why decoding failed
        source: DecodeError,
    },

    // ============================================================================
    // Request Errors
    // ============================================================================
    /// A request field broke a rule
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Invalid configuration or CLI input
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Malformed YAML
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Malformed JSON
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// Reading a file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap a decode failure of the token held in `field`
    pub fn page_token(field: impl Into<String>, source: DecodeError) -> Self {
        Self::PageToken {
            field: field.into(),
            source,
        }
    }

    /// The decode error, if this is one
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Error::Decoding(e) | Error::PageToken { source: e, .. } => Some(e),
            _ => None,
        }
    }

    /// The validation error, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }

    /// Request field the error points at, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation(e) => Some(e.field()),
            Error::PageToken { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether the caller sent something wrong (as opposed to a server-side fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Decoding(_) | Error::PageToken { .. } | Error::Validation(_)
        )
    }
}

/// Result type alias for list-pagination
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Decode Errors
// ============================================================================

/// Reasons a token fails to decode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Empty token
    #[error("token must be provided")]
    MissingToken,

    /// Not three base64url JSON segments
    #[error("token malformed: {reason}")]
    MalformedToken {
        /// What is wrong with it
        reason: String,
    },

    /// Signed without a secret to check it, or unsigned when one was expected
    #[error("verification failed: {reason}")]
    VerificationFailed {
        /// Which mismatch occurred
        reason: String,
    },

    /// Signature does not match the secret
    #[error("invalid signature")]
    InvalidSignature,

    /// `exp` has passed
    #[error("token expired")]
    Expired,
}

impl DecodeError {
    /// Create a malformed token error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }

    /// Create a verification error
    pub fn verification(reason: impl Into<String>) -> Self {
        Self::VerificationFailed {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

/// A bound a value fell outside of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Numeric lower bound (inclusive)
    Min(i64),
    /// Numeric upper bound (inclusive)
    Max(i64),
    /// Exact array length
    Length(usize),
    /// Minimum array length
    MinLength(usize),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min(n) => write!(f, "must be larger than or equal to {n}"),
            Bound::Max(n) => write!(f, "must be less than or equal to {n}"),
            Bound::Length(n) => write!(f, "must contain {n} items"),
            Bound::MinLength(n) => write!(f, "must contain at least {n} items"),
        }
    }
}

/// A request field that broke a rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)] // every variant carries the same `field` path
pub enum ValidationError {
    /// `count` or `page` sent together with another field
    #[error("\"{field}\" is not allowed together with \"{conflict}\"")]
    MutuallyExclusiveFields { field: String, conflict: String },

    /// A number or array length outside its bound
    #[error("\"{field}\" {bound}")]
    OutOfRange { field: String, bound: Bound },

    /// A value outside the allowed set
    #[error("\"{field}\" with value {value} is not an allowed value")]
    NotAllowedValue { field: String, value: String },

    /// Wrong type, missing, or unknown field
    #[error("\"{field}\" {expected}")]
    ShapeMismatch { field: String, expected: String },

    /// The unique id field named explicitly in a plain sort
    #[error("\"{field}\" at position {index} with value \"{value}\" cannot be an included value")]
    DuplicateIncludedValue {
        field: String,
        index: usize,
        value: String,
    },
}

impl ValidationError {
    /// Create a shape mismatch error
    pub fn shape(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(field: impl Into<String>, bound: Bound) -> Self {
        Self::OutOfRange {
            field: field.into(),
            bound,
        }
    }

    /// Create a not-allowed-value error
    pub fn not_allowed(field: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::NotAllowedValue {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Path of the offending field, e.g. `sort[1]` or `page.cursors`
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MutuallyExclusiveFields { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::NotAllowedValue { field, .. }
            | ValidationError::ShapeMismatch { field, .. }
            | ValidationError::DuplicateIncludedValue { field, .. } => field,
        }
    }

    /// Re-root the field path under `parent` (`limit` becomes `page.limit`)
    pub fn nested(self, parent: &str) -> Self {
        let join = |field: String| format!("{parent}.{field}");
        match self {
            ValidationError::MutuallyExclusiveFields { field, conflict } => {
                ValidationError::MutuallyExclusiveFields {
                    field: join(field),
                    conflict,
                }
            }
            ValidationError::OutOfRange { field, bound } => ValidationError::OutOfRange {
                field: join(field),
                bound,
            },
            ValidationError::NotAllowedValue { field, value } => {
                ValidationError::NotAllowedValue {
                    field: join(field),
                    value,
                }
            }
            ValidationError::ShapeMismatch { field, expected } => ValidationError::ShapeMismatch {
                field: join(field),
                expected,
            },
            ValidationError::DuplicateIncludedValue {
                field,
                index,
                value,
            } => ValidationError::DuplicateIncludedValue {
                field: join(field),
                index,
                value,
            },
        }
    }
}
