//! Query string to raw request

use serde_json::{Map, Value};

/// Parse a URL query string into a raw request map
///
/// - `sort` may repeat or hold a comma-separated list; more than one field
///   becomes an array
/// - `filter[key]=value` builds the `filter` object
/// - any other key keeps its last value as a string
///
/// Type conversion is left to the schema, so `limit=3` arrives as `"3"`.
pub fn raw_request_from_query(query: &str) -> Map<String, Value> {
    let mut raw = Map::new();
    let mut sort: Vec<Value> = Vec::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key == "sort" {
            sort.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|field| !field.is_empty())
                    .map(|field| Value::String(field.to_string())),
            );
        } else if let Some(field) = filter_key(&key) {
            let filter = raw
                .entry("filter")
                .or_insert_with(|| Value::Object(Map::new()));
            // A plain `filter=...` wins; the schema reports its shape
            if let Value::Object(filter) = filter {
                filter.insert(field.to_string(), Value::String(value.into_owned()));
            }
        } else {
            raw.insert(key.into_owned(), Value::String(value.into_owned()));
        }
    }

    match sort.len() {
        0 => {}
        1 => {
            raw.insert("sort".to_string(), sort.remove(0));
        }
        _ => {
            raw.insert("sort".to_string(), Value::Array(sort));
        }
    }

    raw
}

/// `filter[name]` -> `name`
fn filter_key(key: &str) -> Option<&str> {
    key.strip_prefix("filter[")
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|name| !name.is_empty())
}
