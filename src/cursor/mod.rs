//! Cursor composition
//!
//! Turns a query plus the page it fetched into the `self`/`first`/`next`/`prev`
//! token set, and turns a token back into paging parameters.
//!
//! # Cursor chain
//!
//! Cursors form a stack, most recent anchor first. Paging forward pushes the
//! last record's identifier; paging back pops the anchor of the page being
//! left. With pages `[1,2,3]`, `[4,5,6]`, `[7,8,9]`:
//!
//! ```text
//! first            cursors []      next [3]
//! next  [3]        cursors [3]     next [6,3]   prev [3]
//! next  [6,3]      cursors [6,3]   next [9,6,3] prev [6,3]
//! prev  [6,3]      pop 6 -> [3]    next [6,3]   prev [3]
//! ```

mod composer;
mod types;

pub use composer::{compose, decompose};
pub use types::{ComposeOptions, Cursor, Identified, PageType, PagingParameters, TokenSet};
