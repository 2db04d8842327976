//! Render-pass assembly.
//!
//! [`GridState::render_pass`] turns the current cache and layout inputs
//! into a [`GridSurface`]: plain data describing what a host should put
//! on screen. Nothing here mutates fetch or item state, and no error is
//! ever thrown across this boundary: failures arrive as surface
//! variants or markers.

use smallvec::SmallVec;

use trellis_core::LoadError;
use trellis_layout::{measure_grid, CellRect, LayoutFrame};

use crate::state::GridState;

/// One frame of the grid, as data.
#[derive(Debug)]
pub enum GridSurface<N> {
    /// No data yet for the current query: show `skeletons` placeholder
    /// slots, or a bare loading marker when zero are configured.
    Loading { skeletons: usize },
    /// The query completed with no items at all.
    Empty,
    /// The initial load failed; nothing can be shown.
    Error { error: LoadError },
    /// Items are on screen.
    Ready(ReadySurface<N>),
}

/// The populated state of the grid.
#[derive(Debug)]
pub struct ReadySurface<N> {
    /// Geometry this surface was laid out with. The layout item count
    /// includes any trailing skeleton slots.
    pub frame: LayoutFrame,
    /// Mounted cells covering `[frame.start_index, frame.end_index)`,
    /// in index order.
    pub cells: SmallVec<[GridCell<N>; 16]>,
    /// Pixel translation of the mounted band from the top of the
    /// virtual content. Everything above is reserved height only.
    pub spacer_top: f32,
    /// Total reserved scroll height for all rows, mounted or not.
    pub total_height: f32,
    /// Whether a later page is currently being fetched.
    pub fetching_more: bool,
    /// Number of trailing skeleton slots included in the layout while
    /// `fetching_more`.
    pub skeleton_tail: usize,
    /// Whether the stream is exhausted; hosts render their
    /// end-of-content marker after the last row.
    pub end_of_content: bool,
    /// A non-blocking pagination failure to surface alongside the
    /// items. The next qualifying scroll retries it.
    pub pagination_error: Option<LoadError>,
}

/// One mounted cell.
#[derive(Debug)]
pub struct GridCell<N> {
    /// Index into the logical item sequence (or a placeholder slot
    /// past its end).
    pub index: usize,
    /// Position relative to the translated band.
    pub rect: CellRect,
    pub slot: GridSlot<N>,
}

/// What a mounted cell holds.
#[derive(Debug)]
pub enum GridSlot<N> {
    /// A rendered item.
    Item(N),
    /// A placeholder for an item still being fetched.
    Skeleton,
}

impl<N> GridSlot<N> {
    pub fn is_skeleton(&self) -> bool {
        matches!(self, GridSlot::Skeleton)
    }
}

impl<T> GridState<T> {
    /// Produces the current frame of the grid.
    ///
    /// `render_item` is invoked once per mounted item, in index order;
    /// it is expected to be a pure function of the item. Items outside
    /// the mounted window cost nothing but the reserved height.
    pub fn render_pass<N>(&self, mut render_item: impl FnMut(&T, usize) -> N) -> GridSurface<N> {
        let inner = self.inner();
        let cache = inner.cache.borrow();
        let spec = inner.spec.borrow();

        if let Some(error) = cache.error() {
            if error.is_blocking() {
                return GridSurface::Error {
                    error: error.clone(),
                };
            }
        }

        let items = cache.items();
        if items.is_empty() {
            // Exhausted with nothing fetched means the query really has
            // no results; anything else is still loading.
            if !cache.has_next_page() {
                return GridSurface::Empty;
            }
            return GridSurface::Loading {
                skeletons: spec.skeleton_count,
            };
        }

        let fetching_more = cache.is_fetching();
        let skeleton_tail = if fetching_more {
            spec.skeleton_count
        } else {
            0
        };
        let layout_count = items.len() + skeleton_tail;

        let (width, height) = inner.viewport.get();
        let frame = measure_grid(
            &spec.measure_config(),
            width,
            height,
            layout_count,
            inner.scroll_top.get(),
        );

        let mut cells: SmallVec<[GridCell<N>; 16]> = SmallVec::new();
        let mut index = frame.start_index;
        for item in items.range(frame.start_index..frame.end_index) {
            cells.push(GridCell {
                index,
                rect: frame.cell_rect(index),
                slot: GridSlot::Item(render_item(item, index)),
            });
            index += 1;
        }
        // Whatever the window covers past the fetched items is the
        // skeleton tail.
        while index < frame.end_index {
            cells.push(GridCell {
                index,
                rect: frame.cell_rect(index),
                slot: GridSlot::Skeleton,
            });
            index += 1;
        }

        let spacer_top = frame.start_offset;
        let total_height = frame.total_height;
        GridSurface::Ready(ReadySurface {
            frame,
            cells,
            spacer_top,
            total_height,
            fetching_more,
            skeleton_tail,
            end_of_content: !cache.has_next_page(),
            pagination_error: cache.error().cloned(),
        })
    }
}
