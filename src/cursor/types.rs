//! Paging parameter and token set types

use crate::error::{DecodeError, Result};
use crate::types::{one_or_many, SigningAlgorithm};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Which link a token stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// The page currently being viewed (`self`)
    #[serde(rename = "self")]
    Current,
    /// The first page; never carries cursors
    First,
    /// The page after the current one
    Next,
    /// The page before the current one
    Prev,
}

impl PageType {
    /// Wire name (`self`, `first`, `next`, `prev`)
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Current => "self",
            PageType::First => "first",
            PageType::Next => "next",
            PageType::Prev => "prev",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque position value (a record's unique identifier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cursor {
    /// Numeric identifier
    Number(Number),
    /// String identifier
    String(String),
}

impl Cursor {
    /// Read a cursor from a JSON value; only strings and numbers qualify
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Cursor::Number(n.clone())),
            Value::String(s) => Some(Cursor::String(s.clone())),
            _ => None,
        }
    }

    /// The cursor as a JSON value
    pub fn to_value(&self) -> Value {
        match self {
            Cursor::Number(n) => Value::Number(n.clone()),
            Cursor::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<i64> for Cursor {
    fn from(n: i64) -> Self {
        Cursor::Number(n.into())
    }
}

impl From<u64> for Cursor {
    fn from(n: u64) -> Self {
        Cursor::Number(n.into())
    }
}

impl From<i32> for Cursor {
    fn from(n: i32) -> Self {
        Cursor::Number(n.into())
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Cursor::String(s.to_string())
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Cursor::String(s)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Number(n) => write!(f, "{n}"),
            Cursor::String(s) => f.write_str(s),
        }
    }
}

/// Canonical paging parameters
///
/// On a fresh request `page_type` is `None` and `cursors` is empty. Parameters
/// decoded from a page token carry the token's `type` and cursor chain, plus
/// its `iat`/`exp` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagingParameters {
    /// Maximum number of records per page
    pub limit: u32,

    /// Sort field specifiers, `-` prefix for descending
    #[serde(deserialize_with = "one_or_many")]
    pub sort: Vec<String>,

    /// Field equality filter
    #[serde(default)]
    pub filter: Map<String, Value>,

    /// Token type this request was derived from
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub page_type: Option<PageType>,

    /// Cursor chain, most recent anchor first
    #[serde(default)]
    pub cursors: Vec<Cursor>,

    /// Issued-at timestamp of the originating token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry timestamp of the originating token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl PagingParameters {
    /// Parameters of a fresh list request
    pub fn new(limit: u32, sort: Vec<String>, filter: Map<String, Value>) -> Self {
        Self {
            limit,
            sort,
            filter,
            page_type: None,
            cursors: Vec::new(),
            iat: None,
            exp: None,
        }
    }

    /// Set the token type
    pub fn with_type(mut self, page_type: PageType) -> Self {
        self.page_type = Some(page_type);
        self
    }

    /// Set the cursor chain
    pub fn with_cursors(mut self, cursors: Vec<Cursor>) -> Self {
        self.cursors = cursors;
        self
    }

    /// Build parameters from a decoded token payload
    pub fn from_payload(payload: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(payload)).map_err(|e| {
            DecodeError::malformed(format!("payload is not a paging state: {e}")).into()
        })
    }

    /// The record to resume after when fetching this page
    ///
    /// For a `prev` request the head cursor anchors the page being left, so the
    /// page to fetch starts after the second cursor (or at the beginning).
    pub fn anchor(&self) -> Option<&Cursor> {
        match self.page_type {
            Some(PageType::Prev) => self.cursors.get(1),
            _ => self.cursors.first(),
        }
    }
}

/// Links produced for one response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Token for the current page
    #[serde(rename = "self")]
    pub current: String,

    /// Token for the first page
    pub first: String,

    /// Token for the next page; absent after a short page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// Token for the previous page; absent when the cursor chain is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl TokenSet {
    /// Present links in `self`, `first`, `next`, `prev` order
    pub fn links(&self) -> Vec<(PageType, &str)> {
        let mut links = vec![
            (PageType::Current, self.current.as_str()),
            (PageType::First, self.first.as_str()),
        ];
        if let Some(next) = &self.next {
            links.push((PageType::Next, next.as_str()));
        }
        if let Some(prev) = &self.prev {
            links.push((PageType::Prev, prev.as_str()));
        }
        links
    }
}

/// Options for [`compose`](super::compose)
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Record field holding the unique identifier (default: `id`)
    pub uuid_key: String,
    /// Secret to sign tokens with
    pub secret: Option<String>,
    /// Lifetime of each token
    pub expires_in: Option<Duration>,
    /// HMAC algorithm used when a secret is given
    pub algorithm: SigningAlgorithm,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            uuid_key: "id".to_string(),
            secret: None,
            expires_in: None,
            algorithm: SigningAlgorithm::default(),
        }
    }
}

impl ComposeOptions {
    /// Default options: `id` key, unsigned, no expiry
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different unique identifier field
    pub fn uuid_key(mut self, uuid_key: impl Into<String>) -> Self {
        self.uuid_key = uuid_key.into();
        self
    }

    /// Sign tokens with the given secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Expire tokens after the given duration
    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }
}

/// A record that exposes a unique identifier
pub trait Identified {
    /// The identifier stored under `key`, if it is a string or number
    fn cursor(&self, key: &str) -> Option<Cursor>;
}

impl Identified for Value {
    fn cursor(&self, key: &str) -> Option<Cursor> {
        self.get(key).and_then(Cursor::from_value)
    }
}

impl Identified for Map<String, Value> {
    fn cursor(&self, key: &str) -> Option<Cursor> {
        self.get(key).and_then(Cursor::from_value)
    }
}
