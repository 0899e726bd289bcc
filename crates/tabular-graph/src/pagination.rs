//! Offset pagination
//!
//! Listings are windows over a deterministically sorted sequence. The page
//! token is opaque to callers: URL-safe base64 over a small JSON document
//! carrying the offset of the next window. An empty token means the first
//! page; a page without a continuation token is the last one.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Serialize, Deserialize)]
struct PageState {
    offset: usize,
}

/// Decode a page token into an offset. The empty token is offset zero.
///
/// # Errors
///
/// [`GraphError::InvalidPageToken`] when the token is not one this module
/// produced. Bad tokens are never silently reset to the first page.
pub fn decode_page_token(token: &str) -> GraphResult<usize> {
    if token.is_empty() {
        return Ok(0);
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| GraphError::InvalidPageToken(e.to_string()))?;
    let state: PageState =
        serde_json::from_slice(&bytes).map_err(|e| GraphError::InvalidPageToken(e.to_string()))?;
    Ok(state.offset)
}

/// Encode an offset as a page token.
pub fn encode_page_token(offset: usize) -> GraphResult<String> {
    let json = serde_json::to_vec(&PageState { offset })
        .map_err(|e| GraphError::PageTokenEncoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// One window of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in this window.
    pub items: Vec<T>,
    /// Token for the next window, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no items and no continuation.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: None,
        }
    }

    /// Whether this is the last page.
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }

    /// Map the items, keeping the continuation token.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }
}

/// Stateless windowing over sorted items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// Create a paginator. A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    /// The configured page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Slice `items` at the offset carried by `token`.
    ///
    /// The window is `[offset, min(offset + page_size, len))`. An offset at
    /// or past the end yields an empty last page.
    pub fn paginate<T>(&self, items: Vec<T>, token: &str) -> GraphResult<Page<T>> {
        let start = decode_page_token(token)?;
        let total = items.len();
        if start >= total {
            return Ok(Page::empty());
        }
        let end = start.saturating_add(self.page_size).min(total);

        let next_page_token = if end < total {
            Some(encode_page_token(end)?)
        } else {
            None
        };

        let items = items.into_iter().skip(start).take(end - start).collect();
        Ok(Page {
            items,
            next_page_token,
        })
    }
}
