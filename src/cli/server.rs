//! HTTP server mode serving an in-memory record list
//!
//! `GET /records` takes the usual paging query (`limit`, `sort`,
//! `filter[field]`, `count`, `page`) and answers one page plus its tokens,
//! also rendered as a `Link` header.

use axum::{
    extract::{FromRef, OriginalUri, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::cursor::{self, Identified, PagingParameters};
use crate::error::{Error, Result};
use crate::http::{link_header, Pagination, PaginationRejection};
use crate::schema::{PageRequest, PaginationSchema, SchemaConfig};

/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Paging rules for `/records`
    pub schema: SchemaConfig,
    /// Records to serve
    pub records: Vec<Value>,
}

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    schema: Arc<PaginationSchema>,
    records: Arc<Vec<Value>>,
}

impl FromRef<AppState> for Arc<PaginationSchema> {
    fn from_ref(state: &AppState) -> Self {
        state.schema.clone()
    }
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Build the router
pub fn router(config: ServerConfig) -> Result<Router> {
    let state = AppState {
        schema: Arc::new(PaginationSchema::new(config.schema)?),
        records: Arc::new(config.records),
    };

    // Build CORS layer - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::LINK]);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/records", get(list_records))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let record_count = config.records.len();
    let app = router(config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(
        "Serving {} records on http://{}/records",
        record_count,
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// List one page of records
async fn list_records(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Pagination(request): Pagination,
) -> Response {
    let uuid_key = &state.schema.config().uuid_key;

    let params = match &request {
        PageRequest::Count => {
            let count = state.records.len();
            return Json(ApiResponse::success(json!({ "count": count }))).into_response();
        }
        PageRequest::List(params) => params,
    };

    let page = select_page(&state.records, params, uuid_key);

    let tokens = match cursor::compose(params, &page, &state.schema.compose_options()) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!("Failed to compose tokens: {e}");
            return PaginationRejection(e).into_response();
        }
    };

    let link = link_header(uri.path(), &tokens);
    (
        StatusCode::OK,
        [(header::LINK, link)],
        Json(ApiResponse::success(json!({
            "records": page,
            "pagination": tokens,
        }))),
    )
        .into_response()
}

// ============================================================================
// Record Selection
// ============================================================================

/// Filter, sort and window the records a request asks for
///
/// The window starts right after the record named by the request's anchor
/// cursor. A cursor that no longer names a record yields an empty page.
fn select_page(records: &[Value], params: &PagingParameters, uuid_key: &str) -> Vec<Value> {
    let mut matching: Vec<&Value> = records
        .iter()
        .filter(|record| matches_filter(record, &params.filter))
        .collect();
    matching.sort_by(|a, b| compare_records(a, b, &params.sort));

    let start = match params.anchor() {
        None => 0,
        Some(anchor) => {
            match matching
                .iter()
                .position(|record| record.cursor(uuid_key).as_ref() == Some(anchor))
            {
                Some(index) => index + 1,
                None => {
                    tracing::warn!("Cursor {anchor} does not match any record");
                    matching.len()
                }
            }
        }
    };

    matching
        .into_iter()
        .skip(start)
        .take(params.limit as usize)
        .cloned()
        .collect()
}

/// Field equality; query values arrive as strings, so `"3"` matches `3`
fn matches_filter(record: &Value, filter: &Map<String, Value>) -> bool {
    filter.iter().all(|(field, expected)| {
        record
            .get(field)
            .is_some_and(|actual| actual == expected || as_text(actual) == as_text(expected))
    })
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_records(a: &Value, b: &Value, sort: &[String]) -> Ordering {
    for spec in sort {
        let (field, descending) = match spec.strip_prefix('-') {
            Some(field) => (field, true),
            None => (spec.as_str(), false),
        };

        let ordering = compare_values(a.get(field), b.get(field));
        let ordering = if descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Missing fields sort first
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Records served when no data file is given
pub(crate) fn sample_records() -> Vec<Value> {
    const COLORS: [&str; 3] = ["red", "green", "blue"];

    (1..=100)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("item-{id:03}"),
                "color": COLORS[id % COLORS.len()],
            })
        })
        .collect()
}
