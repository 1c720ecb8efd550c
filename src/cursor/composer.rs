//! Token set composition and decomposition

use super::types::{ComposeOptions, Cursor, Identified, PageType, PagingParameters, TokenSet};
use crate::error::{Error, Result};
use crate::token::{self, EncodeOptions};
use serde::Serialize;
use serde_json::{Map, Value};

/// Payload stored in every page token
#[derive(Debug, Serialize)]
struct TokenPayload<'a> {
    limit: u32,
    sort: &'a [String],
    filter: &'a Map<String, Value>,
    cursors: &'a [Cursor],
    #[serde(rename = "type")]
    page_type: PageType,
}

/// Compose the `self`, `first`, `next` and `prev` tokens for a fetched page
///
/// - `self` repeats the query's cursor chain untouched.
/// - On a `prev` request the head cursor is popped before the remaining links
///   are built; it anchored the page being viewed.
/// - `first` never carries cursors.
/// - `next` is only built after a full page and prepends the last record's
///   identifier to the (possibly popped) chain.
/// - `prev` is only built while the chain is non-empty.
///
/// The first failing encode aborts the whole composition.
pub fn compose<R: Identified>(
    query: &PagingParameters,
    page: &[R],
    options: &ComposeOptions,
) -> Result<TokenSet> {
    let encode_options = EncodeOptions {
        secret: options.secret.as_deref(),
        expires_in: options.expires_in,
        include_issued_at: true,
        algorithm: options.algorithm,
    };
    let encode = |cursors: &[Cursor], page_type: PageType| {
        token::encode(
            &TokenPayload {
                limit: query.limit,
                sort: &query.sort,
                filter: &query.filter,
                cursors,
                page_type,
            },
            &encode_options,
        )
    };

    let current = encode(&query.cursors, PageType::Current)?;

    let mut cursors = query.cursors.clone();
    if query.page_type == Some(PageType::Prev) && !cursors.is_empty() {
        cursors.remove(0);
    }

    let first = encode(&[], PageType::First)?;

    let next = if page.len() == query.limit as usize {
        let last = page
            .last()
            .and_then(|record| record.cursor(&options.uuid_key))
            .ok_or_else(|| {
                Error::encoding(format!(
                    "last record has no '{}' value to page from",
                    options.uuid_key
                ))
            })?;

        let mut chain = Vec::with_capacity(cursors.len() + 1);
        chain.push(last);
        chain.extend(cursors.iter().cloned());
        Some(encode(&chain, PageType::Next)?)
    } else {
        None
    };

    let prev = if cursors.is_empty() {
        None
    } else {
        Some(encode(&cursors, PageType::Prev)?)
    };

    tracing::debug!(
        "Composed tokens for {} records (next: {}, prev: {})",
        page.len(),
        next.is_some(),
        prev.is_some()
    );

    Ok(TokenSet {
        current,
        first,
        next,
        prev,
    })
}

/// Decode a page token back into its payload
///
/// No token means a first-ever request and yields an empty payload.
pub fn decompose(token: Option<&str>, secret: Option<&str>) -> Result<Map<String, Value>> {
    match token {
        None => Ok(Map::new()),
        Some(token) => token::decode(token, secret),
    }
}
