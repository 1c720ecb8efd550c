//! Schema configuration loading
//!
//! Reads a [`SchemaConfig`] from a YAML or JSON file. Missing keys take their
//! documented defaults; the result is checked by building a schema from it, so
//! a config that loads is one the validator accepts.

use crate::error::{Error, Result};
use crate::schema::{PaginationSchema, SchemaConfig};
use std::fs;
use std::path::Path;

/// Load a schema configuration from a `.yaml`, `.yml` or `.json` file
///
/// # Examples
///
/// ```ignore
/// let config = load_config("pagination.yaml")?;
/// let schema = PaginationSchema::new(config)?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SchemaConfig> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config = if is_json {
        serde_json::from_str(&content)?
    } else {
        parse(&content)?
    };

    validate_config(&config)?;
    tracing::debug!("Loaded pagination config from {}", path.display());
    Ok(config)
}

/// Load a schema configuration from a YAML (or JSON) string
pub fn load_config_from_str(content: &str) -> Result<SchemaConfig> {
    let config = parse(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn parse(content: &str) -> Result<SchemaConfig> {
    if content.trim().is_empty() {
        return Ok(SchemaConfig::default());
    }
    if content.trim_start().starts_with('{') {
        return Ok(serde_json::from_str(content)?);
    }
    Ok(serde_yaml::from_str(content)?)
}

fn validate_config(config: &SchemaConfig) -> Result<()> {
    PaginationSchema::new(config.clone())
        .map(|_| ())
        .map_err(|e| match e {
            Error::Config { message } => Error::config(format!("Invalid pagination config: {message}")),
            other => other,
        })
}
