//! Pagination request schema
//!
//! Validates the query of a list request and resolves it into canonical
//! paging parameters.
//!
//! # Overview
//!
//! - `count` and `page` are mutually exclusive with each other and with every
//!   plain paging field.
//! - A `page` token is decoded, verified and shape-checked; its payload then
//!   stands in for the plain fields.
//! - A plain request gets `limit`, `sort` and `filter` defaults from
//!   [`SchemaConfig`], with the unique id field always sorted last.

pub mod rules;
mod types;
mod validator;

pub use types::{FieldKind, FieldRule, FilterSchema, PageRequest, SchemaConfig};
pub use validator::{resolve, validate_request, PaginationSchema};

#[cfg(test)]
mod tests;
