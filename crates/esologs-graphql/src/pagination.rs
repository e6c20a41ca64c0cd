//! Pagination helpers for GraphQL APIs.
//!
//! ESO Logs uses two shapes: numbered pages (`PaginatedResult`, used by
//! report, guild and character lists) and an opaque continuation value
//! (`nextPageTimestamp` on report events). Both helpers stop at an optional
//! [`PageLimit`] and return whatever error the page fetcher produced.

use std::fmt::Debug;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A numbered page as returned by the ESO Logs schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// Items in the page.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Total item count across all pages.
    pub total: u64,
    /// Page size used by the server.
    pub per_page: u32,
    /// 1-based number of this page.
    pub current_page: u32,
    /// Index of the first item on this page.
    #[serde(default)]
    pub from: Option<u64>,
    /// Index of the last item on this page.
    #[serde(default)]
    pub to: Option<u64>,
    /// Number of the last page.
    pub last_page: u32,
    /// Whether more pages follow.
    pub has_more_pages: bool,
}

impl<T> PaginatedResult<T> {
    /// Number of the page after this one, if any.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        if self.has_more_pages && self.current_page < self.last_page {
            self.current_page.checked_add(1)
        } else {
            None
        }
    }
}

/// A page addressed by a continuation cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T, C> {
    /// Items in the page.
    pub items: Vec<T>,
    /// Cursor for the next page, `None` on the last page.
    pub next: Option<C>,
}

/// Page limit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit {
    /// Maximum number of items to fetch.
    pub max_items: usize,
}

impl PageLimit {
    /// Create a new limit.
    #[must_use]
    pub const fn new(max_items: usize) -> Self {
        Self { max_items }
    }
}

/// Collect items from numbered pages starting at `first_page`.
pub async fn paginate_pages<T, E, F, Fut>(
    first_page: u32,
    limit: Option<PageLimit>,
    mut fetch_page: F,
) -> Result<Vec<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PaginatedResult<T>, E>>,
{
    let mut out = Vec::new();
    let mut page_number = first_page;
    loop {
        let page = fetch_page(page_number).await?;
        let next = page.next_page();
        if take_into(&mut out, page.data, limit) {
            debug!(items = out.len(), "page limit reached");
            break;
        }

        match next {
            Some(next) if next > page_number => page_number = next,
            Some(next) => {
                warn!(page = page_number, next, "server returned a non-advancing page number");
                break;
            }
            None => break,
        }
    }
    Ok(out)
}

/// Collect items by following a continuation cursor.
///
/// Iteration ends when the server returns no cursor, when the cursor stops
/// changing, or at the page limit.
pub async fn paginate_cursor<T, C, E, F, Fut>(
    mut cursor: Option<C>,
    limit: Option<PageLimit>,
    mut fetch_page: F,
) -> Result<Vec<T>, E>
where
    C: Clone + PartialEq + Debug,
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = Result<CursorPage<T, C>, E>>,
{
    let mut out = Vec::new();
    loop {
        let page = fetch_page(cursor.clone()).await?;
        if take_into(&mut out, page.items, limit) {
            debug!(items = out.len(), "page limit reached");
            break;
        }

        match page.next {
            Some(next) if cursor.as_ref() == Some(&next) => {
                warn!(cursor = ?next, "cursor did not advance");
                break;
            }
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(out)
}

/// Append `items` up to the limit; returns `true` once the limit is reached.
fn take_into<T>(out: &mut Vec<T>, items: Vec<T>, limit: Option<PageLimit>) -> bool {
    match limit {
        Some(limit) => {
            let remaining = limit.max_items.saturating_sub(out.len());
            out.extend(items.into_iter().take(remaining));
            out.len() >= limit.max_items
        }
        None => {
            out.extend(items);
            false
        }
    }
}
