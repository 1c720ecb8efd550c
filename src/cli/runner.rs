//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::load_config;
use crate::error::{Error, Result};
use crate::http::{raw_request_from_query, tokenize};
use crate::schema::{PaginationSchema, SchemaConfig};
use crate::token::{self, parse_duration, EncodeOptions};
use crate::types::{OptionStringExt, SigningAlgorithm};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Encode {
                payload,
                expires_in,
                no_timestamp,
                algorithm,
            } => self.encode(
                payload,
                expires_in.as_deref(),
                *no_timestamp,
                algorithm.as_deref(),
            ),
            Commands::Decode { token } => self.decode(token),
            Commands::Compose {
                query,
                page,
                uuid_key,
            } => self.compose(query, page, uuid_key.as_deref()),
            Commands::Validate { request, query } => {
                self.validate(request.as_deref(), query.as_deref())
            }
            Commands::Serve { port, data } => {
                let config = crate::cli::ServerConfig {
                    schema: self.load_config()?,
                    records: match data {
                        Some(path) => load_records(path)?,
                        None => crate::cli::server::sample_records(),
                    },
                };
                crate::cli::serve(config, *port).await
            }
        }
    }

    /// Load the schema config, applying the `--secret` override
    fn load_config(&self) -> Result<SchemaConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_config(path)?,
            None => SchemaConfig::default(),
        };
        if let Some(secret) = self.secret() {
            config.secret = Some(secret);
        }
        Ok(config)
    }

    fn secret(&self) -> Option<String> {
        self.cli.secret.clone().none_if_empty()
    }

    fn encode(
        &self,
        payload: &str,
        expires_in: Option<&str>,
        no_timestamp: bool,
        algorithm: Option<&str>,
    ) -> Result<()> {
        let payload: Value = serde_json::from_str(payload)?;
        let secret = self.secret();

        let mut options = EncodeOptions::new().secret(secret.as_deref());
        if let Some(expires_in) = expires_in {
            options = options.expires_in(parse_duration(expires_in)?);
        }
        if no_timestamp {
            options = options.without_issued_at();
        }
        if let Some(alg) = algorithm {
            let alg = SigningAlgorithm::from_header(&alg.to_uppercase())
                .ok_or_else(|| Error::config(format!("Unsupported algorithm: {alg}")))?;
            options = options.algorithm(alg);
        }

        let token = token::encode(&payload, &options)?;
        self.output(&Value::String(token))
    }

    fn decode(&self, token: &str) -> Result<()> {
        let secret = self.load_config()?.secret;
        let payload = token::decode(token, secret.as_deref())?;
        self.output(&payload)
    }

    fn compose(&self, query: &str, page: &str, uuid_key: Option<&str>) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(uuid_key) = uuid_key {
            config.uuid_key = uuid_key.to_string();
        }
        let schema = PaginationSchema::new(config)?;

        let raw = parse_object("query", query)?;
        let records: Vec<Value> = serde_json::from_str(page)?;

        let request = schema.validate(&raw)?;
        let tokens = tokenize(&request, &records, &schema.compose_options())?;
        self.output(&tokens)
    }

    fn validate(&self, request: Option<&str>, query: Option<&str>) -> Result<()> {
        let raw = match (request, query) {
            (Some(request), _) => parse_object("request", request)?,
            (None, Some(query)) => raw_request_from_query(query),
            (None, None) => Map::new(),
        };

        let schema = PaginationSchema::new(self.load_config()?)?;
        let request = schema.validate(&raw)?;
        self.output(&request)
    }

    /// Print a value in the selected format
    fn output<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }
}

fn parse_object(name: &str, json: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(json)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::config(format!("--{name} must be a JSON object"))),
    }
}

/// Read a JSON array of records
fn load_records(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read data file '{}': {}",
            path.display(),
            e
        ))
    })?;
    let records: Vec<Value> = serde_json::from_str(&content)?;
    tracing::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
