//! HTTP integration
//!
//! Glue between the paging core and an axum service.
//!
//! # Flow
//!
//! 1. [`Pagination`] reads the query string, validates it through the
//!    [`PaginationSchema`](crate::schema::PaginationSchema) in router state and
//!    rejects bad requests with `400`
//! 2. The handler fetches the page the parameters describe
//! 3. [`tokenize`] composes the response tokens and [`link_header`] renders
//!    them as an RFC 5988 `Link` value

mod extract;
mod links;
mod query;

pub use extract::{tokenize, Pagination, PaginationRejection};
pub use links::{link_header, parse_link_header};
pub use query::raw_request_from_query;
