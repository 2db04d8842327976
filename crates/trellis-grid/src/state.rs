//! Grid state object and host integration surface.
//!
//! [`GridState`] is the single owner of everything the grid tracks:
//! the page cache for the current query, the measured viewport, the
//! tracked scroll offset, and the scroll throttle. It is a cheaply
//! cloneable handle (`Rc` inner), so it can be captured by event
//! handlers without explicit sharing ceremony. There is no module-wide
//! registry: dropping the last handle releases every page and
//! callback the grid ever held.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use web_time::Instant;

use trellis_core::{LoadError, PageCache, PageFetcher, PollOutcome, QueryIdentity};
use trellis_layout::measure_grid;

use crate::spec::GridSpec;
use crate::throttle::ScrollThrottle;

type ObserverMap = RefCell<HashMap<u64, Rc<dyn Fn()>>>;

/// State handle for one grid instance.
pub struct GridState<T> {
    inner: Rc<GridStateInner<T>>,
}

impl<T> Clone for GridState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

// Two handles are equal when they share the same underlying state.
impl<T> PartialEq for GridState<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

pub(crate) struct GridStateInner<T> {
    pub(crate) cache: RefCell<PageCache<T>>,
    pub(crate) spec: RefCell<GridSpec>,
    pub(crate) scroll_top: Cell<f32>,
    /// Measured container size (width, height); read-only inputs owned
    /// by the host.
    pub(crate) viewport: Cell<(f32, f32)>,
    throttle: RefCell<ScrollThrottle>,
    observers: Rc<ObserverMap>,
    next_observer_id: Cell<u64>,
}

/// What one [`GridState::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickSummary {
    /// Outcome of polling the in-flight fetch.
    pub fetch: PollOutcome,
    /// Whether a coalesced trailing scroll position was applied.
    pub applied_trailing_scroll: bool,
    /// Whether this tick started a new page fetch.
    pub started_fetch: bool,
}

impl<T> GridState<T> {
    pub fn new(spec: GridSpec) -> Self {
        let throttle = ScrollThrottle::new(spec.throttle_interval);
        Self {
            inner: Rc::new(GridStateInner {
                cache: RefCell::new(PageCache::new()),
                spec: RefCell::new(spec),
                scroll_top: Cell::new(0.0),
                viewport: Cell::new((0.0, 0.0)),
                throttle: RefCell::new(throttle),
                observers: Rc::new(RefCell::new(HashMap::new())),
                next_observer_id: Cell::new(1),
            }),
        }
    }

    /// Installs the query this grid shows.
    ///
    /// Query parameter changes are the sole trigger for a cache reset:
    /// a different identity discards prior pages, scrolls back to the
    /// top, and immediately requests page 0. Passing the identity
    /// already installed only swaps the fetcher.
    ///
    /// Returns whether the identity actually changed.
    pub fn set_query(&self, identity: QueryIdentity, fetcher: PageFetcher<T>) -> bool {
        let switched = self.inner.cache.borrow_mut().set_query(identity, fetcher);
        if switched {
            self.inner.scroll_top.set(0.0);
            self.inner.throttle.borrow_mut().reset();
            self.inner.cache.borrow_mut().fetch_next();
            self.invalidate();
        }
        switched
    }

    /// Records a scroll position reported by the host container.
    ///
    /// Rate-limited: the first event in a throttle window recomputes
    /// immediately, later ones are coalesced and applied by the next
    /// [`tick`](Self::tick) once the window elapses, so the terminal
    /// position is never lost. An accepted position may trigger the
    /// next page fetch when the bottom comes within the threshold.
    pub fn notify_scroll(&self, position: f32, now: Instant) {
        let accepted = self.inner.throttle.borrow_mut().offer(position, now);
        if let Some(position) = accepted {
            self.inner.scroll_top.set(position.max(0.0));
            self.maybe_fetch();
            self.invalidate();
        }
    }

    /// Records a container resize.
    ///
    /// Resizes bypass the scroll throttle: the layout must react
    /// immediately, and a taller viewport may bring the bottom within
    /// the fetch threshold.
    pub fn notify_resized(&self, width: f32, height: f32) {
        self.inner.viewport.set((width, height));
        self.maybe_fetch();
        self.invalidate();
    }

    /// Drives the grid from the host event loop.
    ///
    /// Polls the in-flight page fetch and applies a due trailing
    /// scroll position. A freshly appended page re-checks the fetch
    /// threshold so short pages keep loading until the content
    /// overflows the viewport; a failed fetch does not, and becomes
    /// eligible again on the next qualifying scroll or resize.
    pub fn tick(&self, now: Instant) -> TickSummary {
        let trailing = self.inner.throttle.borrow_mut().take_due(now);
        if let Some(position) = trailing {
            self.inner.scroll_top.set(position.max(0.0));
        }

        let fetch = self.inner.cache.borrow_mut().poll();
        let appended = matches!(fetch, PollOutcome::Appended);
        let data_changed = matches!(
            fetch,
            PollOutcome::Appended | PollOutcome::EndOfStream | PollOutcome::Failed
        );

        let started_fetch = if trailing.is_some() || appended {
            self.maybe_fetch()
        } else {
            false
        };

        if trailing.is_some() || data_changed || started_fetch {
            self.invalidate();
        }

        TickSummary {
            fetch,
            applied_trailing_scroll: trailing.is_some(),
            started_fetch,
        }
    }

    /// [`tick`](Self::tick) with the current time.
    pub fn tick_now(&self) -> TickSummary {
        self.tick(Instant::now())
    }

    /// Registers a callback fired whenever the grid needs re-rendering.
    ///
    /// The returned registration detaches the callback when dropped,
    /// on every exit path including unwinding, so hosts can tie it to
    /// their mount/unmount lifecycle.
    #[must_use = "dropping the registration detaches the observer"]
    pub fn observe(&self, callback: impl Fn() + 'static) -> ObserverRegistration {
        let id = self.inner.next_observer_id.get();
        self.inner.next_observer_id.set(id + 1);
        self.inner
            .observers
            .borrow_mut()
            .insert(id, Rc::new(callback));
        ObserverRegistration {
            observers: Rc::downgrade(&self.inner.observers),
            id,
        }
    }

    /// Replaces the spec, e.g. when the host reconfigures the grid.
    pub fn set_spec(&self, spec: GridSpec) {
        *self.inner.throttle.borrow_mut() = ScrollThrottle::new(spec.throttle_interval);
        *self.inner.spec.borrow_mut() = spec;
        self.invalidate();
    }

    pub fn spec(&self) -> GridSpec {
        self.inner.spec.borrow().clone()
    }

    pub fn scroll_top(&self) -> f32 {
        self.inner.scroll_top.get()
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.inner.viewport.get()
    }

    pub fn is_fetching(&self) -> bool {
        self.inner.cache.borrow().is_fetching()
    }

    pub fn has_next_page(&self) -> bool {
        self.inner.cache.borrow().has_next_page()
    }

    pub fn item_count(&self) -> usize {
        self.inner.cache.borrow().items().len()
    }

    pub fn load_error(&self) -> Option<LoadError> {
        self.inner.cache.borrow().error().cloned()
    }

    pub(crate) fn inner(&self) -> &GridStateInner<T> {
        &self.inner
    }

    /// Starts the next fetch when the bottom of the content is within
    /// the configured threshold. Returns whether a fetch started.
    fn maybe_fetch(&self) -> bool {
        let mut cache = self.inner.cache.borrow_mut();
        if cache.is_fetching() || !cache.has_next_page() || !cache.has_query() {
            return false;
        }
        let spec = self.inner.spec.borrow();
        let (width, height) = self.inner.viewport.get();
        let frame = measure_grid(
            &spec.measure_config(),
            width,
            height,
            cache.items().len(),
            self.inner.scroll_top.get(),
        );
        if frame.distance_to_end(height) < spec.threshold {
            cache.fetch_next()
        } else {
            false
        }
    }

    fn invalidate(&self) {
        // Clone the callbacks out of the borrow before calling them so
        // an observer may call back into this state.
        let callbacks: Vec<Rc<dyn Fn()>> =
            self.inner.observers.borrow().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }
}

/// RAII registration returned by [`GridState::observe`].
pub struct ObserverRegistration {
    observers: Weak<ObserverMap>,
    id: u64,
}

impl ObserverRegistration {
    /// Detaches the observer eagerly.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for ObserverRegistration {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            observers.borrow_mut().remove(&self.id);
        }
    }
}
