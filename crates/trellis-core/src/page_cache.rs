//! Incremental page cache with single-flight fetch coordination.
//!
//! [`PageCache`] owns the growing list of pages for one
//! [`QueryIdentity`] and guarantees at most one outstanding fetch at a
//! time. Mutual exclusion is the `is_fetching` flag, not a lock:
//! execution is single-threaded, so check-then-set is atomic.
//!
//! Pages settle strictly in increasing page-index order; the next page
//! is never requested before the previous one has settled. Switching
//! the identity supersedes any in-flight fetch: its late result is
//! polled to completion and discarded, never merged into the new
//! identity's pages.

use std::future::Future;
use std::ops::Range;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_task::noop_waker;

use crate::{FetchError, LoadError, QueryIdentity};

/// Future returned by a page fetch.
pub type PageFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, FetchError>>>>;

/// Caller-supplied page fetch function.
///
/// Must be deterministic for a fixed (page index, query identity) pair
/// so a failed page can be retried safely. Query parameters are baked
/// into the closure by the caller.
pub type PageFetcher<T> = Box<dyn FnMut(PageRequest) -> PageFuture<T>>;

/// The request handed to a [`PageFetcher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based index of the page to fetch.
    pub page_index: usize,
}

/// What [`PageCache::poll`] observed this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// No fetch in flight.
    Idle,
    /// The in-flight fetch has not settled yet.
    Pending,
    /// A non-empty page was appended.
    Appended,
    /// An empty page arrived; the stream is exhausted.
    EndOfStream,
    /// The fetch failed; the error is recorded on the cache.
    Failed,
    /// A fetch settled for a superseded identity and was discarded.
    DiscardedStale,
}

struct InFlightFetch<T> {
    generation: u64,
    page_index: usize,
    future: PageFuture<T>,
}

/// Ordered pages plus fetch state for one query identity.
///
/// Owned by a single component instance; there is no module-wide
/// registry, so dropping the cache releases everything it holds.
pub struct PageCache<T> {
    identity: Option<QueryIdentity>,
    fetcher: Option<PageFetcher<T>>,
    pages: Vec<Vec<T>>,
    /// Cumulative item offsets; `offsets[i]` is the index of the first
    /// item of page `i`, and the last entry is the total item count.
    /// Extended on append, so renders never re-flatten.
    offsets: Vec<usize>,
    is_fetching: bool,
    has_next_page: bool,
    error: Option<LoadError>,
    /// Bumped on every identity switch; a settle whose generation no
    /// longer matches is discarded.
    generation: u64,
    in_flight: Option<InFlightFetch<T>>,
    /// In-flight fetches left over from superseded identities. Polled
    /// until they settle, then dropped without touching the pages.
    superseded: Vec<InFlightFetch<T>>,
}

impl<T> Default for PageCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageCache<T> {
    pub fn new() -> Self {
        Self {
            identity: None,
            fetcher: None,
            pages: Vec::new(),
            offsets: vec![0],
            is_fetching: false,
            has_next_page: true,
            error: None,
            generation: 0,
            in_flight: None,
            superseded: Vec::new(),
        }
    }

    /// Installs the query this cache serves.
    ///
    /// Identities are compared by value. A different identity discards
    /// all pages, clears any recorded error, resets the fetch state to
    /// `{is_fetching: false, has_next_page: true}`, and supersedes any
    /// in-flight fetch. The same identity only swaps in the new fetcher
    /// and keeps everything else untouched.
    ///
    /// Returns `true` when the identity actually changed.
    pub fn set_query(&mut self, identity: QueryIdentity, fetcher: PageFetcher<T>) -> bool {
        if self.identity.as_ref() == Some(&identity) {
            self.fetcher = Some(fetcher);
            return false;
        }

        log::debug!("page cache switching to query '{identity}'");
        self.identity = Some(identity);
        self.fetcher = Some(fetcher);
        self.generation = self.generation.wrapping_add(1);
        if let Some(in_flight) = self.in_flight.take() {
            self.superseded.push(in_flight);
        }
        self.pages.clear();
        self.offsets.clear();
        self.offsets.push(0);
        self.is_fetching = false;
        self.has_next_page = true;
        self.error = None;
        true
    }

    /// Starts fetching the next page.
    ///
    /// No-op while a fetch is in flight, after the stream is exhausted,
    /// or before a query has been installed. Starting a fetch clears
    /// any recorded error, which is what makes a failed page eligible
    /// for retry. Returns whether a fetch was started.
    pub fn fetch_next(&mut self) -> bool {
        if self.is_fetching || !self.has_next_page {
            return false;
        }
        let Some(fetcher) = self.fetcher.as_mut() else {
            return false;
        };

        let page_index = self.pages.len();
        let future = fetcher(PageRequest { page_index });
        self.in_flight = Some(InFlightFetch {
            generation: self.generation,
            page_index,
            future,
        });
        self.is_fetching = true;
        self.error = None;
        true
    }

    /// Polls the in-flight fetch (if any) with a no-op waker.
    ///
    /// Called by the host from its event loop; this is the cache's only
    /// suspension point.
    pub fn poll(&mut self) -> PollOutcome {
        self.poll_superseded();

        let Some(mut in_flight) = self.in_flight.take() else {
            return PollOutcome::Idle;
        };

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        match in_flight.future.as_mut().poll(&mut cx) {
            Poll::Pending => {
                self.in_flight = Some(in_flight);
                PollOutcome::Pending
            }
            Poll::Ready(result) => self.settle(in_flight.generation, in_flight.page_index, result),
        }
    }

    fn settle(
        &mut self,
        generation: u64,
        page_index: usize,
        result: Result<Vec<T>, FetchError>,
    ) -> PollOutcome {
        if generation != self.generation {
            log::debug!("discarding settled fetch for superseded query (page {page_index})");
            return PollOutcome::DiscardedStale;
        }

        self.is_fetching = false;
        match result {
            Ok(page) if page.is_empty() => {
                self.has_next_page = false;
                PollOutcome::EndOfStream
            }
            Ok(page) => {
                self.push_page(page);
                PollOutcome::Appended
            }
            Err(source) => {
                let error = if self.pages.is_empty() {
                    LoadError::Initial(source)
                } else {
                    LoadError::Pagination {
                        page: page_index,
                        source,
                    }
                };
                log::warn!("page fetch failed: {error}");
                self.error = Some(error);
                PollOutcome::Failed
            }
        }
    }

    fn poll_superseded(&mut self) {
        if self.superseded.is_empty() {
            return;
        }
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        self.superseded
            .retain_mut(|fetch| match fetch.future.as_mut().poll(&mut cx) {
                Poll::Pending => true,
                Poll::Ready(_) => {
                    log::debug!(
                        "discarding late response for superseded query (page {})",
                        fetch.page_index
                    );
                    false
                }
            });
    }

    fn push_page(&mut self, page: Vec<T>) {
        let total = self.offsets.last().copied().unwrap_or(0);
        self.offsets.push(total + page.len());
        self.pages.push(page);
    }

    /// The flattened item sequence for the current identity.
    pub fn items(&self) -> ItemSequence<'_, T> {
        ItemSequence {
            pages: &self.pages,
            offsets: &self.offsets,
        }
    }

    /// Whether a fetch is currently in flight.
    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    /// Whether the server may still have more pages.
    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// The error recorded by the most recent failed fetch, if any.
    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    /// Number of pages fetched so far (also the next page index).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether a query has been installed yet.
    pub fn has_query(&self) -> bool {
        self.identity.is_some()
    }

    /// The identity currently served, if any.
    pub fn identity(&self) -> Option<&QueryIdentity> {
        self.identity.as_ref()
    }
}

/// Read-only view over the logical concatenation of all fetched pages.
///
/// Indexing goes through the cached cumulative offsets, so slicing a
/// window out of a deep list is a binary search plus a short walk, not
/// an O(n) flatten.
#[derive(Clone, Copy)]
pub struct ItemSequence<'a, T> {
    pages: &'a [Vec<T>],
    offsets: &'a [usize],
}

impl<'a, T> ItemSequence<'a, T> {
    /// Total number of fetched items.
    pub fn len(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item at `index`, if fetched.
    pub fn get(&self, index: usize) -> Option<&'a T> {
        if index >= self.len() {
            return None;
        }
        let page = self.offsets.partition_point(|&offset| offset <= index) - 1;
        self.pages[page].get(index - self.offsets[page])
    }

    /// Iterates the items in `range`, clamped to the fetched length.
    pub fn range(&self, range: Range<usize>) -> impl Iterator<Item = &'a T> {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        let count = end - start;
        let start_page = self
            .offsets
            .partition_point(|&offset| offset <= start)
            .saturating_sub(1);
        let within_page = start - self.offsets.get(start_page).copied().unwrap_or(0);
        self.pages
            .iter()
            .skip(start_page)
            .flat_map(|page| page.iter())
            .skip(within_page)
            .take(count)
    }

    /// Iterates every fetched item in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a T> {
        self.range(0..self.len())
    }
}
