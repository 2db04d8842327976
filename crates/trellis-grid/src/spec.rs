//! Configuration surface for the grid widget.

use std::time::Duration;

use trellis_layout::GridMeasureConfig;

/// Specification for grid sizing, windowing, and fetch behavior.
///
/// All knobs are caller-supplied; the defaults match a card grid with a
/// small gap and a ~500px fetch threshold.
#[derive(Clone, Debug)]
pub struct GridSpec {
    /// Minimum width a cell may be laid out at.
    pub item_min_width: f32,
    /// Minimum height a cell may be laid out at.
    pub item_min_height: f32,
    /// Fixed height added on top of the cell width for the description
    /// block under square content.
    pub content_offset_height: f32,
    /// Spacing between cells, both axes.
    pub gap: f32,
    /// Distance in pixels from the bottom of the virtual content at
    /// which the next page fetch is triggered.
    pub threshold: f32,
    /// Placeholder slots shown during the initial load and appended
    /// while a later page is being fetched. Zero disables skeletons.
    pub skeleton_count: usize,
    /// Minimum time between scroll-driven recomputations. The latest
    /// position inside a window is applied by the trailing run.
    pub throttle_interval: Duration,
    /// Rows mounted above the visible band.
    pub rows_before: usize,
    /// Rows mounted below the visible band.
    pub rows_after: usize,
    /// Extra items mounted past the last lookahead row; `None` means
    /// one row's worth of columns.
    pub overscan_items: Option<usize>,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            item_min_width: 200.0,
            item_min_height: 200.0,
            content_offset_height: 0.0,
            gap: 2.0,
            threshold: 500.0,
            skeleton_count: 0,
            throttle_interval: Duration::from_millis(200),
            rows_before: 1,
            rows_after: 2,
            overscan_items: None,
        }
    }
}

impl GridSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_min_width(mut self, width: f32) -> Self {
        self.item_min_width = width;
        self
    }

    pub fn item_min_height(mut self, height: f32) -> Self {
        self.item_min_height = height;
        self
    }

    pub fn content_offset_height(mut self, height: f32) -> Self {
        self.content_offset_height = height;
        self
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn skeleton_count(mut self, count: usize) -> Self {
        self.skeleton_count = count;
        self
    }

    pub fn throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    pub fn lookahead(mut self, rows_before: usize, rows_after: usize) -> Self {
        self.rows_before = rows_before;
        self.rows_after = rows_after;
        self
    }

    pub fn overscan_items(mut self, items: usize) -> Self {
        self.overscan_items = Some(items);
        self
    }

    /// The subset of the spec the layout crate measures with.
    pub fn measure_config(&self) -> GridMeasureConfig {
        GridMeasureConfig {
            item_min_width: self.item_min_width,
            item_min_height: self.item_min_height,
            content_offset_height: self.content_offset_height,
            gap: self.gap,
            rows_before: self.rows_before,
            rows_after: self.rows_after,
            overscan_items: self.overscan_items,
        }
    }
}
