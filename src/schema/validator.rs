//! Request validation and token precedence

use super::rules;
use super::types::{PageRequest, SchemaConfig};
use crate::cursor::{self, ComposeOptions, Cursor, PageType, PagingParameters};
use crate::error::{Bound, Error, Result, ValidationError};
use crate::token::parse_duration;
use chrono::Duration;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Three base64url segments, the last one possibly empty
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z_-]+\.[0-9A-Za-z_-]+\.[0-9A-Za-z_-]*$").unwrap()
});

/// Fields a plain list request may carry
const PLAIN_FIELDS: &[&str] = &["limit", "sort", "filter"];

/// Fields a page token payload may carry
const PAYLOAD_FIELDS: &[&str] = &["limit", "sort", "filter", "type", "cursors", "iat", "exp"];

/// Token types a request may page with
const PAGE_TYPES: &[&str] = &["first", "next", "prev"];

/// Validates raw paging requests against a [`SchemaConfig`]
///
/// A request is exactly one of:
///
/// - `{count}`: a truthy literal; yields [`PageRequest::Count`]
/// - `{page}`: a token from a previous response; its payload becomes the
///   canonical parameters
/// - plain `{limit?, sort?, filter?}`: defaults applied from the config
///
/// # Examples
///
/// ```
/// use list_pagination::schema::{PageRequest, PaginationSchema, SchemaConfig};
/// use serde_json::json;
///
/// let schema = PaginationSchema::new(SchemaConfig::new().max(10)).unwrap();
/// let raw = json!({"limit": "5", "sort": "-created"});
///
/// let request = schema.validate(raw.as_object().unwrap()).unwrap();
/// let params = request.parameters().unwrap();
/// assert_eq!(params.limit, 5);
/// assert_eq!(params.sort, vec!["-created", "id"]);
/// ```
#[derive(Debug, Clone)]
pub struct PaginationSchema {
    config: SchemaConfig,
    sort_patterns: Vec<Regex>,
    default_sort: Vec<String>,
    expires_in: Option<Duration>,
}

impl PaginationSchema {
    /// Build a schema, checking the configuration once
    pub fn new(config: SchemaConfig) -> Result<Self> {
        if config.uuid_key.is_empty() {
            return Err(Error::config("uuid_key cannot be empty"));
        }
        if config.uuid_key.starts_with(['-', '+']) {
            return Err(Error::config(format!(
                "uuid_key '{}' cannot carry a sort direction",
                config.uuid_key
            )));
        }
        if config.max == 0 {
            return Err(Error::config("max must be at least 1"));
        }
        if let Some(value) = config.count_valid.iter().find(|v| !is_literal(v)) {
            return Err(Error::config(format!(
                "count_valid entries must be strings, numbers or booleans, got {value}"
            )));
        }

        let patterns: Vec<&str> = if config.sort_valid.is_empty() {
            vec![".+"]
        } else {
            config.sort_valid.iter().map(String::as_str).collect()
        };
        let sort_patterns = patterns
            .into_iter()
            .map(|pattern| {
                Regex::new(&format!("(?i)^-?(?:{pattern})$")).map_err(|e| {
                    Error::config(format!("Invalid sort_valid pattern '{pattern}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut default_sort = Vec::with_capacity(config.sort.len() + 1);
        for field in &config.sort {
            if is_uuid(field, &config.uuid_key) {
                continue;
            }
            if !sort_patterns.iter().any(|re| re.is_match(field)) {
                return Err(Error::config(format!(
                    "Default sort field '{field}' is not allowed by sort_valid"
                )));
            }
            if !default_sort.contains(field) {
                default_sort.push(field.clone());
            }
        }
        default_sort.push(config.uuid_key.clone());

        if let Some(filter_schema) = &config.filter_schema {
            for (name, rule) in &filter_schema.fields {
                if let Some(default) = &rule.default {
                    rule.check(&format!("filter.{name}"), default.clone())
                        .map_err(|e| Error::config(format!("Invalid filter default: {e}")))?;
                }
            }
        }

        let expires_in = config.expires_in.as_deref().map(parse_duration).transpose()?;

        Ok(Self {
            config,
            sort_patterns,
            default_sort,
            expires_in,
        })
    }

    /// The configuration this schema was built from
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Sort fields used when a plain request names none
    pub fn default_sort(&self) -> &[String] {
        &self.default_sort
    }

    /// Options for composing the tokens of a response
    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            uuid_key: self.config.uuid_key.clone(),
            secret: self.config.secret.clone(),
            expires_in: self.expires_in,
            algorithm: self.config.algorithm,
        }
    }

    /// Validate a raw request into canonical paging parameters
    pub fn validate(&self, raw: &Map<String, Value>) -> Result<PageRequest> {
        check_exclusive(raw)?;

        if let Some(count) = raw.get("count") {
            self.validate_count(count)?;
            tracing::debug!("Validated count request");
            return Ok(PageRequest::Count);
        }

        let page = raw
            .get("page")
            .map(|token| self.validate_page(token))
            .transpose()?;

        let params = resolve(page, || self.validate_plain(raw))?;
        tracing::debug!(
            "Validated list request (limit: {}, type: {:?}, cursors: {})",
            params.limit,
            params.page_type,
            params.cursors.len()
        );
        Ok(PageRequest::List(params))
    }

    fn validate_count(&self, value: &Value) -> std::result::Result<(), ValidationError> {
        let truthy = matches!(value, Value::Bool(true))
            || value.as_str() == Some("true")
            || self.config.count_valid.contains(value);
        if truthy {
            return Ok(());
        }

        match value {
            Value::Bool(false) => Err(ValidationError::not_allowed("count", value)),
            Value::String(s) if s == "false" => Err(ValidationError::not_allowed("count", value)),
            _ => Err(ValidationError::shape("count", "must be a boolean")),
        }
    }

    fn validate_page(&self, value: &Value) -> Result<PagingParameters> {
        let token = value
            .as_str()
            .filter(|token| TOKEN_PATTERN.is_match(token))
            .ok_or_else(|| ValidationError::shape("page", "fails to match the token pattern"))?;

        let payload = cursor::decompose(Some(token), self.config.secret.as_deref())
            .map_err(|e| match e {
                Error::Decoding(source) => Error::page_token("page", source),
                other => other,
            })?;
        let params = self
            .validate_payload(&payload)
            .map_err(|e| e.nested("page"))?;
        Ok(params)
    }

    fn validate_payload(
        &self,
        payload: &Map<String, Value>,
    ) -> std::result::Result<PagingParameters, ValidationError> {
        let limit = self.validate_limit(rules::required(payload, "limit")?)?;
        let sort = self.validate_page_sort(rules::required(payload, "sort")?)?;
        let filter = self.validate_filter(Some(rules::required(payload, "filter")?))?;

        let page_type = match rules::required(payload, "type")? {
            Value::String(s) => match rules::one_of("type", &s.as_str(), PAGE_TYPES)? {
                &"first" => PageType::First,
                &"next" => PageType::Next,
                _ => PageType::Prev,
            },
            _ => return Err(ValidationError::shape("type", "must be a string")),
        };

        let cursors = match rules::required(payload, "cursors")? {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    Cursor::from_value(item).ok_or_else(|| {
                        ValidationError::shape(
                            format!("cursors[{i}]"),
                            "must be a string or a number",
                        )
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?,
            _ => return Err(ValidationError::shape("cursors", "must be an array")),
        };
        let bound = if page_type == PageType::First {
            Bound::Length(0)
        } else {
            Bound::MinLength(1)
        };
        rules::length("cursors", cursors.len(), bound)?;

        let iat = payload.get("iat").map(|v| timestamp("iat", v)).transpose()?;
        let exp = payload.get("exp").map(|v| timestamp("exp", v)).transpose()?;

        rules::only_keys("", payload, PAYLOAD_FIELDS)?;

        Ok(PagingParameters {
            limit,
            sort,
            filter,
            page_type: Some(page_type),
            cursors,
            iat,
            exp,
        })
    }

    fn validate_plain(&self, raw: &Map<String, Value>) -> Result<PagingParameters> {
        rules::only_keys("", raw, PLAIN_FIELDS)?;

        let limit = match raw.get("limit") {
            Some(value) => self.validate_limit(value)?,
            None => self.config.max,
        };

        let sort = match raw.get("sort") {
            Some(value) => self.validate_plain_sort(value)?,
            None => self.default_sort.clone(),
        };

        let filter = self.validate_filter(raw.get("filter"))?;

        Ok(PagingParameters::new(limit, sort, filter))
    }

    fn validate_limit(&self, value: &Value) -> std::result::Result<u32, ValidationError> {
        let limit = rules::integer("limit", value)?;
        let limit = rules::range("limit", limit, 1, i64::from(self.config.max))?;
        Ok(limit as u32)
    }

    /// Sort of a token payload: the id field is expected to be present already
    fn validate_page_sort(&self, value: &Value) -> std::result::Result<Vec<String>, ValidationError> {
        let sort = rules::string_list("sort", value)?;
        rules::length("sort", sort.len(), Bound::MinLength(1))?;

        for (i, field) in sort.iter().enumerate() {
            if *field != self.config.uuid_key && !self.is_allowed_sort(field) {
                return Err(ValidationError::not_allowed(format!("sort[{i}]"), field));
            }
        }
        rules::unique("sort", &sort)?;

        if !sort.iter().any(|field| is_uuid(field, &self.config.uuid_key)) {
            return Err(ValidationError::shape(
                "sort",
                format!("must include \"{}\"", self.config.uuid_key),
            ));
        }

        Ok(sort)
    }

    /// Sort of a plain request: the id field is appended, never given
    fn validate_plain_sort(&self, value: &Value) -> std::result::Result<Vec<String>, ValidationError> {
        let mut sort = rules::string_list("sort", value)?;

        for (i, field) in sort.iter().enumerate() {
            if !self.is_allowed_sort(field) {
                return Err(ValidationError::not_allowed(format!("sort[{i}]"), field));
            }
        }
        rules::unique("sort", &sort)?;

        if let Some(index) = sort
            .iter()
            .position(|field| is_uuid(field, &self.config.uuid_key))
        {
            return Err(ValidationError::DuplicateIncludedValue {
                field: "sort".to_string(),
                index,
                value: sort[index].clone(),
            });
        }

        sort.push(self.config.uuid_key.clone());
        Ok(sort)
    }

    fn validate_filter(
        &self,
        value: Option<&Value>,
    ) -> std::result::Result<Map<String, Value>, ValidationError> {
        let filter = match value {
            Some(value) => rules::object("filter", value)?.clone(),
            None => Map::new(),
        };

        match &self.config.filter_schema {
            Some(schema) => schema.apply("filter", filter),
            None => Ok(filter),
        }
    }

    fn is_allowed_sort(&self, field: &str) -> bool {
        self.sort_patterns.iter().any(|re| re.is_match(field))
    }
}

/// Merge a decoded page token with a plain request
///
/// When a token is present its fields are copied as the canonical parameters
/// and the plain request is never consulted; otherwise the plain request is
/// validated and used.
pub fn resolve<F>(page: Option<PagingParameters>, plain: F) -> Result<PagingParameters>
where
    F: FnOnce() -> Result<PagingParameters>,
{
    match page {
        Some(token) => Ok(PagingParameters {
            limit: token.limit,
            sort: token.sort,
            filter: token.filter,
            page_type: token.page_type,
            cursors: token.cursors,
            iat: token.iat,
            exp: token.exp,
        }),
        None => plain(),
    }
}

/// Validate a raw request against a configuration in one call
pub fn validate_request(raw: &Map<String, Value>, config: &SchemaConfig) -> Result<PageRequest> {
    PaginationSchema::new(config.clone())?.validate(raw)
}

/// `count` and `page` each exclude every other field
fn check_exclusive(raw: &Map<String, Value>) -> std::result::Result<(), ValidationError> {
    for field in ["count", "page"] {
        if !raw.contains_key(field) {
            continue;
        }
        if let Some(conflict) = raw.keys().find(|key| key.as_str() != field) {
            return Err(ValidationError::MutuallyExclusiveFields {
                field: field.to_string(),
                conflict: conflict.clone(),
            });
        }
    }
    Ok(())
}

/// Whether a sort specifier names the id field, in either direction
fn is_uuid(field: &str, uuid_key: &str) -> bool {
    field.strip_prefix(['-', '+']).unwrap_or(field) == uuid_key
}

fn is_literal(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn timestamp(field: &str, value: &Value) -> std::result::Result<i64, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| ValidationError::shape(field, "must be a number")),
        _ => Err(ValidationError::shape(field, "must be a number")),
    }
}
