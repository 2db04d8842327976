//! Deterministic page fetchers for tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::task::Poll;

use trellis_core::{FetchError, PageFetcher, PageFuture, PageRequest};

/// A scripted sequence of page results, consumed in order.
///
/// Each call to the fetcher pops the next scripted result and resolves
/// immediately. The script asserts that pages are requested in strictly
/// increasing order starting at 0; any gap or repeat (other than a
/// retry of the page that just failed) is a bug in the caller.
pub struct FetchScript<T> {
    results: VecDeque<Result<Vec<T>, FetchError>>,
}

impl<T: 'static> FetchScript<T> {
    pub fn new() -> Self {
        Self {
            results: VecDeque::new(),
        }
    }

    /// Scripts a successful page.
    pub fn page(mut self, items: Vec<T>) -> Self {
        self.results.push_back(Ok(items));
        self
    }

    /// Scripts a failed page.
    pub fn error(mut self, error: FetchError) -> Self {
        self.results.push_back(Err(error));
        self
    }

    /// Scripts the terminal empty page.
    pub fn end(self) -> Self {
        self.page(Vec::new())
    }

    /// Builds the fetcher. The returned handle reports how many
    /// requests were made and with which page indices.
    pub fn into_fetcher(self) -> (PageFetcher<T>, FetchLog) {
        let log = FetchLog {
            requests: Rc::new(RefCell::new(Vec::new())),
        };
        let log_for_fetcher = log.clone();
        let mut results = self.results;
        let fetcher = Box::new(move |request: PageRequest| -> PageFuture<T> {
            let mut requests = log_for_fetcher.requests.borrow_mut();
            match requests.last() {
                None => assert_eq!(request.page_index, 0, "first request must be page 0"),
                Some(&last) => assert!(
                    request.page_index == last || request.page_index == last + 1,
                    "page {} requested after page {last}",
                    request.page_index
                ),
            }
            requests.push(request.page_index);
            let result = results
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted fetch of page {}", request.page_index));
            Box::pin(std::future::ready(result))
        });
        (fetcher, log)
    }
}

impl<T: 'static> Default for FetchScript<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Record of the page indices a scripted fetcher was asked for.
#[derive(Clone)]
pub struct FetchLog {
    requests: Rc<RefCell<Vec<usize>>>,
}

impl FetchLog {
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requested_pages(&self) -> Vec<usize> {
        self.requests.borrow().clone()
    }
}

type PendingSlot<T> = Rc<RefCell<Option<Result<Vec<T>, FetchError>>>>;

/// A fetcher whose futures stay pending until the test resolves them.
///
/// Used to exercise in-flight semantics: single-flight enforcement,
/// skeleton tails, and late responses for superseded queries.
#[derive(Clone)]
pub struct PendingFetcher<T> {
    slots: Rc<RefCell<Vec<(usize, PendingSlot<T>)>>>,
    next_request: Rc<Cell<usize>>,
}

impl<T: 'static> PendingFetcher<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
            next_request: Rc::new(Cell::new(0)),
        }
    }

    /// The fetcher to hand to the grid. Can be called several times
    /// (e.g. once per `set_query`); all of them share this handle's
    /// request log.
    pub fn fetcher(&self) -> PageFetcher<T> {
        let slots = Rc::clone(&self.slots);
        let next_request = Rc::clone(&self.next_request);
        Box::new(move |request: PageRequest| -> PageFuture<T> {
            next_request.set(next_request.get() + 1);
            let slot: PendingSlot<T> = Rc::new(RefCell::new(None));
            slots
                .borrow_mut()
                .push((request.page_index, Rc::clone(&slot)));
            Box::pin(std::future::poll_fn(move |_cx| {
                match slot.borrow_mut().take() {
                    Some(result) => Poll::Ready(result),
                    None => Poll::Pending,
                }
            }))
        })
    }

    /// Number of fetches started so far.
    pub fn request_count(&self) -> usize {
        self.next_request.get()
    }

    /// Page indices of every fetch started so far, in request order.
    pub fn requested_pages(&self) -> Vec<usize> {
        self.slots.borrow().iter().map(|(page, _)| *page).collect()
    }

    /// Resolves the `nth` started request (0-based) with `result`.
    ///
    /// Panics when that request was never started or already resolved.
    pub fn resolve(&self, nth: usize, result: Result<Vec<T>, FetchError>) {
        let slots = self.slots.borrow();
        let (_, slot) = slots
            .get(nth)
            .unwrap_or_else(|| panic!("request {nth} was never started"));
        let replaced = slot.borrow_mut().replace(result);
        assert!(replaced.is_none(), "request {nth} resolved twice");
    }
}

impl<T: 'static> Default for PendingFetcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    #[test]
    fn test_fetch_script_pops_in_order() {
        let (mut fetcher, log) = FetchScript::new()
            .page(vec![1, 2])
            .page(vec![3])
            .end()
            .into_fetcher();

        // Drive the futures by hand.
        let waker = futures_task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        for (page, expected) in [(0, vec![1, 2]), (1, vec![3]), (2, Vec::new())] {
            let mut future = fetcher(PageRequest { page_index: page });
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(Ok(items)) => assert_eq!(items, expected),
                other => panic!("page {page} did not resolve: {other:?}"),
            }
        }
        assert_eq!(log.requested_pages(), vec![0, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "page 2 requested after page 0")]
    fn test_fetch_script_rejects_page_gap() {
        let (mut fetcher, _log) = FetchScript::new()
            .page(vec![1])
            .page(vec![2])
            .page(vec![3])
            .into_fetcher();
        let _ = fetcher(PageRequest { page_index: 0 });
        let _ = fetcher(PageRequest { page_index: 2 });
    }

    #[test]
    fn test_pending_fetcher_resolves_by_hand() {
        let pending: PendingFetcher<u32> = PendingFetcher::new();
        let mut fetcher = pending.fetcher();
        let mut future = fetcher(PageRequest { page_index: 0 });

        let waker = futures_task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        assert!(future.as_mut().poll(&mut cx).is_pending());

        pending.resolve(0, Ok(vec![7]));
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(Ok(items)) => assert_eq!(items, vec![7]),
            other => panic!("expected resolution, got {other:?}"),
        }
    }
}
