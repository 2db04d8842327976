//! Error taxonomy for page fetching.
//!
//! Errors are data: they travel upward through poll results and render
//! state, never across the render boundary as panics.

use thiserror::Error;

/// Failure produced by a caller-supplied page fetch.
///
/// The fetch function is a black box to this crate; the variants only
/// classify the failure coarsely so a surface can choose an
/// appropriate message. Timeout/retry policy belongs to the fetch
/// function itself.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response arrived but could not be decoded into items.
    #[error("decode error: {0}")]
    Decode(String),

    /// Anything else the fetch function wants to surface.
    #[error("{0}")]
    Other(String),
}

/// A fetch failure classified by how much data was already on screen.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The very first page for the current query failed; there is
    /// nothing to show, so the whole surface renders an error state.
    #[error("initial load failed: {0}")]
    Initial(#[source] FetchError),

    /// A later page failed. Already-cached pages stay rendered and the
    /// next qualifying scroll retries the same page.
    #[error("fetching page {page} failed: {source}")]
    Pagination {
        page: usize,
        #[source]
        source: FetchError,
    },
}

impl LoadError {
    /// Whether this error blocks rendering entirely.
    pub fn is_blocking(&self) -> bool {
        matches!(self, LoadError::Initial(_))
    }

    /// The underlying fetch failure.
    pub fn fetch_error(&self) -> &FetchError {
        match self {
            LoadError::Initial(source) => source,
            LoadError::Pagination { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_is_blocking() {
        let err = LoadError::Initial(FetchError::Transport("timeout".into()));
        assert!(err.is_blocking());
    }

    #[test]
    fn test_pagination_is_not_blocking() {
        let err = LoadError::Pagination {
            page: 3,
            source: FetchError::Other("boom".into()),
        };
        assert!(!err.is_blocking());
        assert_eq!(err.fetch_error(), &FetchError::Other("boom".into()));
    }
}
