//! Validation combinators
//!
//! Small checks that each take a field path and a value and either return the
//! converted value or a [`ValidationError`] naming that path. The request
//! validator is built by chaining these.

use crate::error::{Bound, ValidationError};
use serde_json::{Map, Number, Value};

/// Fetch a required key from an object
pub fn required<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Value, ValidationError> {
    map.get(key)
        .ok_or_else(|| ValidationError::shape(key, "is required"))
}

/// Require an object value
pub fn object<'a>(field: &str, value: &'a Value) -> Result<&'a Map<String, Value>, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::shape(field, "must be an object"))
}

/// Reject keys outside `allowed`
///
/// With a non-empty `parent`, reported paths are `parent.key`.
pub fn only_keys(
    parent: &str,
    map: &Map<String, Value>,
    allowed: &[&str],
) -> Result<(), ValidationError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) if parent.is_empty() => Err(ValidationError::shape(key.as_str(), "is not allowed")),
        Some(key) => Err(ValidationError::shape(
            format!("{parent}.{key}"),
            "is not allowed",
        )),
        None => Ok(()),
    }
}

/// Read an integer, converting numeric strings
pub fn integer(field: &str, value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.as_f64().is_some_and(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64) {
                Ok(n.as_f64().unwrap_or_default() as i64)
            } else {
                Err(ValidationError::shape(field, "must be an integer"))
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().or_else(|_| {
                if s.parse::<f64>().is_ok() {
                    Err(ValidationError::shape(field, "must be an integer"))
                } else {
                    Err(ValidationError::shape(field, "must be a number"))
                }
            })
        }
        _ => Err(ValidationError::shape(field, "must be a number")),
    }
}

/// Read a number, converting numeric strings
pub fn number(field: &str, value: &Value) -> Result<Number, ValidationError> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i.into());
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| ValidationError::shape(field, "must be a number"))
        }
        _ => Err(ValidationError::shape(field, "must be a number")),
    }
}

/// Read a boolean, converting `"true"`/`"false"`
pub fn boolean(field: &str, value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ValidationError::shape(field, "must be a boolean")),
    }
}

/// Require `min <= n <= max`
pub fn range(field: &str, n: i64, min: i64, max: i64) -> Result<i64, ValidationError> {
    if n < min {
        Err(ValidationError::out_of_range(field, Bound::Min(min)))
    } else if n > max {
        Err(ValidationError::out_of_range(field, Bound::Max(max)))
    } else {
        Ok(n)
    }
}

/// Require an array length rule
pub fn length(field: &str, len: usize, bound: Bound) -> Result<(), ValidationError> {
    let ok = match bound {
        Bound::Length(n) => len == n,
        Bound::MinLength(n) => len >= n,
        Bound::Min(n) => len as i64 >= n,
        Bound::Max(n) => len as i64 <= n,
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(field, bound))
    }
}

/// Require the value to be one of `allowed`
pub fn one_of<'a, T>(field: &str, value: &T, allowed: &'a [T]) -> Result<&'a T, ValidationError>
where
    T: PartialEq + std::fmt::Display,
{
    allowed
        .iter()
        .find(|candidate| *candidate == value)
        .ok_or_else(|| ValidationError::not_allowed(field, value))
}

/// Read a single string or an array of strings
pub fn string_list(field: &str, value: &Value) -> Result<Vec<String>, ValidationError> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ValidationError::shape(format!("{field}[{i}]"), "must be a string"))
            })
            .collect(),
        _ => Err(ValidationError::shape(
            field,
            "must be a string or an array of strings",
        )),
    }
}

/// Reject repeated items
pub fn unique<T: PartialEq>(field: &str, items: &[T]) -> Result<(), ValidationError> {
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            return Err(ValidationError::shape(
                format!("{field}[{i}]"),
                "contains a duplicate value",
            ));
        }
    }
    Ok(())
}
