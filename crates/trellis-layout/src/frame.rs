//! Viewport window measurement.
//!
//! [`measure_grid`] is the core virtualization algorithm: it computes the
//! responsive column layout, the total virtual scroll height, and the
//! inclusive-exclusive index window `[start_index, end_index)` that must
//! be mounted to cover the visible viewport plus a lookahead margin.
//! Everything outside the window is represented purely by reserved
//! height, so element cost stays bounded by viewport size regardless of
//! how many items have been fetched.

use crate::columns::{resolve_columns, GridMeasureConfig};

/// Derived geometry for one render of the grid.
///
/// A pure function of its inputs; recomputed whenever container size,
/// scroll offset, or item count changes, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutFrame {
    /// Number of columns, always at least 1.
    pub columns: usize,
    /// Width each cell is laid out at.
    pub item_width: f32,
    /// Height each cell is laid out at.
    pub item_height: f32,
    /// Spacing between cells, both axes.
    pub gap: f32,
    /// Total row count for the current item count.
    pub rows: usize,
    /// Reserved virtual scroll height covering every row, mounted or not.
    pub total_height: f32,
    /// Scroll offset after clamping to the valid range. Stale offsets
    /// from a resize or an item-count shrink are tolerated here.
    pub scroll_top: f32,
    /// First mounted row.
    pub start_row: usize,
    /// One past the last mounted row.
    pub end_row: usize,
    /// First mounted item index.
    pub start_index: usize,
    /// One past the last mounted item index.
    pub end_index: usize,
    /// Pixel translation of the first mounted row from the top of the
    /// virtual content.
    pub start_offset: f32,
}

/// Position and size of one mounted cell, relative to the translated
/// band that starts at [`LayoutFrame::start_offset`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutFrame {
    /// Number of items the window mounts.
    pub fn mounted_len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Whether the window mounts anything at all.
    pub fn is_empty_window(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Remaining distance in pixels between the bottom of the virtual
    /// content and the bottom edge of the viewport. Negative once the
    /// viewport extends past the content.
    pub fn distance_to_end(&self, viewport_height: f32) -> f32 {
        self.total_height - (self.scroll_top + viewport_height)
    }

    /// Rect for a mounted cell, relative to the translated band.
    ///
    /// The index must lie within `[start_index, end_index)`.
    pub fn cell_rect(&self, index: usize) -> CellRect {
        debug_assert!(
            index >= self.start_index && index < self.end_index,
            "cell_rect called for unmounted index {index}"
        );
        let column = index % self.columns;
        let row = index / self.columns;
        CellRect {
            x: column as f32 * (self.item_width + self.gap),
            y: (row.saturating_sub(self.start_row)) as f32 * (self.item_height + self.gap),
            width: self.item_width,
            height: self.item_height,
        }
    }
}

/// Measures the grid: column solve, virtual height, and mounted window.
///
/// The scroll offset is clamped before any row math so a stale offset
/// (after a resize or a shrinking result set) cannot produce a window
/// outside the content. One row of negative lookahead and
/// `rows_after` rows of positive lookahead keep items that are about to
/// scroll into view mounted ahead of time; `overscan_items` adds an
/// explicit slack past the last lookahead row to absorb partial-row
/// rounding (it defaults to one row's worth of columns).
pub fn measure_grid(
    config: &GridMeasureConfig,
    viewport_width: f32,
    viewport_height: f32,
    item_count: usize,
    scroll_top: f32,
) -> LayoutFrame {
    let resolved = resolve_columns(config, viewport_width);
    let columns = resolved.columns;

    let rows = item_count.div_ceil(columns);
    let total_height = if rows == 0 {
        0.0
    } else {
        rows as f32 * resolved.item_height + (rows - 1) as f32 * config.gap
    };

    let max_scroll = (total_height - viewport_height).max(0.0);
    let clamped = scroll_top.clamp(0.0, max_scroll);

    if rows == 0 || viewport_height <= 0.0 {
        return LayoutFrame {
            columns,
            item_width: resolved.item_width,
            item_height: resolved.item_height,
            gap: config.gap,
            rows,
            total_height,
            scroll_top: clamped,
            start_row: 0,
            end_row: 0,
            start_index: 0,
            end_index: 0,
            start_offset: 0.0,
        };
    }

    let row_stride = resolved.item_height + config.gap;

    let first_visible_row = (clamped / row_stride).floor() as usize;
    let start_row = first_visible_row.saturating_sub(config.rows_before);

    let last_visible_row = ((clamped + viewport_height) / row_stride).floor() as usize;
    let end_row = (last_visible_row + config.rows_after).min(rows);
    let end_row = end_row.max(start_row);

    let overscan = config.overscan_items.unwrap_or(columns);
    let start_index = (start_row * columns).min(item_count);
    let end_index = (end_row * columns + overscan).min(item_count).max(start_index);

    LayoutFrame {
        columns,
        item_width: resolved.item_width,
        item_height: resolved.item_height,
        gap: config.gap,
        rows,
        total_height,
        scroll_top: clamped,
        start_row,
        end_row,
        start_index,
        end_index,
        start_offset: start_row as f32 * row_stride,
    }
}
