//! Request extractor and response tokens

use super::query::raw_request_from_query;
use crate::cursor::{self, ComposeOptions, Identified, TokenSet};
use crate::error::{Error, Result};
use crate::schema::{PageRequest, PaginationSchema};
use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Validated paging request taken from the query string
///
/// The schema comes from router state, so the state must provide an
/// `Arc<PaginationSchema>` through [`FromRef`].
///
/// ```ignore
/// async fn list(Pagination(request): Pagination) -> impl IntoResponse {
///     match request {
///         PageRequest::Count => ...,
///         PageRequest::List(params) => ...,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination(pub PageRequest);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    Arc<PaginationSchema>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = PaginationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let schema = Arc::<PaginationSchema>::from_ref(state);
        let raw = raw_request_from_query(parts.uri.query().unwrap_or_default());

        schema.validate(&raw).map(Pagination).map_err(|e| {
            tracing::debug!("Rejected paging request: {e}");
            PaginationRejection(e)
        })
    }
}

/// Rejection for [`Pagination`]
///
/// Client mistakes (bad fields, bad tokens) answer `400`; anything else `500`.
/// The body names the offending field when there is one:
///
/// ```json
/// {"success": false, "error": "...", "field": "page.cursors"}
/// ```
#[derive(Debug)]
pub struct PaginationRejection(pub Error);

impl PaginationRejection {
    /// Status code for this rejection
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for PaginationRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let field = self.0.field().map(str::to_string);

        let mut body = json!({
            "success": false,
            "error": self.0.to_string(),
        });
        if let Some(field) = field {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}

/// Compose the response tokens for a validated request
///
/// Count requests have no pages and yield `None`.
pub fn tokenize<R: Identified>(
    request: &PageRequest,
    page: &[R],
    options: &ComposeOptions,
) -> Result<Option<TokenSet>> {
    match request {
        PageRequest::Count => Ok(None),
        PageRequest::List(params) => cursor::compose(params, page, options).map(Some),
    }
}
