//! Schema types

use super::rules;
use crate::cursor::PagingParameters;
use crate::error::{Bound, ValidationError};
use crate::types::{one_or_many, SigningAlgorithm};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// Schema Config
// ============================================================================

/// Options recognized by [`PaginationSchema`](super::PaginationSchema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Unique identifier field, always the last sort key (default: `id`)
    pub uuid_key: String,

    /// Literals besides `true` that turn on `count` (default: `"1"`)
    #[serde(deserialize_with = "one_or_many")]
    pub count_valid: Vec<Value>,

    /// Maximum and default page size (default: 25)
    pub max: u32,

    /// Default sort fields for a plain request
    #[serde(deserialize_with = "one_or_many")]
    pub sort: Vec<String>,

    /// Allowed sort field patterns, matched case-insensitively as
    /// `^-?<pattern>$`; empty allows any field
    #[serde(deserialize_with = "one_or_many")]
    pub sort_valid: Vec<String>,

    /// Shape of the `filter` object
    pub filter_schema: Option<FilterSchema>,

    /// Secret used to sign and verify page tokens
    pub secret: Option<String>,

    /// HMAC algorithm used when a secret is set
    pub algorithm: SigningAlgorithm,

    /// Lifetime of composed tokens, e.g. `15m` or `1h`
    pub expires_in: Option<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            uuid_key: "id".to_string(),
            count_valid: vec![Value::String("1".to_string())],
            max: 25,
            sort: Vec::new(),
            sort_valid: Vec::new(),
            filter_schema: None,
            secret: None,
            algorithm: SigningAlgorithm::default(),
            expires_in: None,
        }
    }
}

impl SchemaConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unique identifier field
    pub fn uuid_key(mut self, uuid_key: impl Into<String>) -> Self {
        self.uuid_key = uuid_key.into();
        self
    }

    /// Replace the truthy `count` literals
    pub fn count_valid(mut self, values: Vec<Value>) -> Self {
        self.count_valid = values;
        self
    }

    /// Set the maximum page size
    pub fn max(mut self, max: u32) -> Self {
        self.max = max;
        self
    }

    /// Set the default sort fields
    pub fn sort<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.sort = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the allowed sort fields
    pub fn sort_valid<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.sort_valid = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Validate `filter` against a schema
    pub fn filter_schema(mut self, schema: FilterSchema) -> Self {
        self.filter_schema = Some(schema);
        self
    }

    /// Sign and verify tokens with a secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Expire composed tokens after a duration such as `15m`
    pub fn expires_in(mut self, expires_in: impl Into<String>) -> Self {
        self.expires_in = Some(expires_in.into());
        self
    }
}

// ============================================================================
// Filter Schema
// ============================================================================

/// Type of a filter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Any JSON value
    #[default]
    Any,
    /// Strings only
    String,
    /// Any number; numeric strings are converted
    Number,
    /// Whole number; numeric strings are converted
    Integer,
    /// `true`/`false`, also as strings
    Boolean,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Any => write!(f, "any"),
            FieldKind::String => write!(f, "string"),
            FieldKind::Number => write!(f, "number"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// Rule for one filter field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Expected type
    #[serde(rename = "type", default)]
    pub kind: FieldKind,

    /// Field must be present (after defaults)
    #[serde(default)]
    pub required: bool,

    /// Value used when the field is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Allowed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<Vec<Value>>,

    /// Numeric lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    /// Numeric upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl FieldRule {
    /// A rule of the given kind
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// A string field
    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    /// A number field
    pub fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    /// An integer field
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    /// A boolean field
    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Default value when absent
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restrict to a set of values
    pub fn valid(mut self, values: Vec<Value>) -> Self {
        self.valid = Some(values);
        self
    }

    /// Numeric bounds
    pub fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Check (and convert) a value against this rule
    pub fn check(&self, field: &str, value: Value) -> Result<Value, ValidationError> {
        let value = match self.kind {
            FieldKind::Any => value,
            FieldKind::String => match value {
                Value::String(_) => value,
                _ => return Err(ValidationError::shape(field, "must be a string")),
            },
            FieldKind::Number => Value::Number(rules::number(field, &value)?),
            FieldKind::Integer => Value::from(rules::integer(field, &value)?),
            FieldKind::Boolean => Value::Bool(rules::boolean(field, &value)?),
        };

        if let Some(valid) = &self.valid {
            rules::one_of(field, &value, valid)?;
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min {
                if n < min as f64 {
                    return Err(ValidationError::out_of_range(field, Bound::Min(min)));
                }
            }
            if let Some(max) = self.max {
                if n > max as f64 {
                    return Err(ValidationError::out_of_range(field, Bound::Max(max)));
                }
            }
        }

        Ok(value)
    }
}

/// Shape of the `filter` object
///
/// Fields not listed are rejected unless `allow_unknown` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSchema {
    /// Known fields and their rules
    #[serde(default)]
    pub fields: BTreeMap<String, FieldRule>,

    /// Accept fields that are not listed
    #[serde(default)]
    pub allow_unknown: bool,
}

impl FilterSchema {
    /// An empty schema (accepts only `{}` unless `allow_unknown`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field rule
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    /// Accept fields that are not listed
    pub fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    /// Validate a filter object, applying defaults and conversions
    ///
    /// `parent` prefixes reported field paths (`filter.foo`).
    pub fn apply(
        &self,
        parent: &str,
        mut filter: Map<String, Value>,
    ) -> Result<Map<String, Value>, ValidationError> {
        if !self.allow_unknown {
            let known: Vec<&str> = self.fields.keys().map(String::as_str).collect();
            rules::only_keys(parent, &filter, &known)?;
        }

        for (name, rule) in &self.fields {
            let path = format!("{parent}.{name}");
            match filter.remove(name).or_else(|| rule.default.clone()) {
                Some(value) => {
                    let value = rule.check(&path, value)?;
                    filter.insert(name.clone(), value);
                }
                None if rule.required => {
                    return Err(ValidationError::shape(path, "is required"));
                }
                None => {}
            }
        }

        Ok(filter)
    }
}

// ============================================================================
// Validated Request
// ============================================================================

/// Outcome of validating a raw request
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    /// The caller only wants the total count
    Count,
    /// A list request with canonical paging parameters
    List(PagingParameters),
}

impl PageRequest {
    /// Check if this is a count request
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count)
    }

    /// Paging parameters of a list request
    pub fn parameters(&self) -> Option<&PagingParameters> {
        match self {
            Self::Count => None,
            Self::List(params) => Some(params),
        }
    }

    /// Take the paging parameters of a list request
    pub fn into_parameters(self) -> Option<PagingParameters> {
        match self {
            Self::Count => None,
            Self::List(params) => Some(params),
        }
    }
}

impl Serialize for PageRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("count", &true)?;
                map.end()
            }
            Self::List(params) => params.serialize(serializer),
        }
    }
}
