//! Responsive column solving.
//!
//! Given an available container width and per-item sizing constraints,
//! determines how many columns fit and the exact cell size each column
//! receives once inter-item gaps are subtracted.

/// Sizing constraints and window tuning for grid measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMeasureConfig {
    /// Minimum width a cell may be laid out at.
    pub item_min_width: f32,

    /// Minimum height a cell may be laid out at.
    pub item_min_height: f32,

    /// Fixed height added on top of the cell width for non-square content
    /// (e.g. a description block under a square preview).
    pub content_offset_height: f32,

    /// Spacing between cells, both axes.
    pub gap: f32,

    /// Rows mounted above the visible band so items scrolling up into
    /// view are already present.
    pub rows_before: usize,

    /// Rows mounted below the visible band.
    pub rows_after: usize,

    /// Extra items mounted past the last lookahead row. `None` resolves
    /// to one row's worth of columns at measure time.
    pub overscan_items: Option<usize>,
}

impl Default for GridMeasureConfig {
    fn default() -> Self {
        Self {
            item_min_width: 200.0,
            item_min_height: 200.0,
            content_offset_height: 0.0,
            gap: 2.0,
            rows_before: 1,
            rows_after: 2,
            overscan_items: None,
        }
    }
}

/// Result of the column solve: how many columns fit and the cell size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedColumns {
    /// Number of columns, always at least 1.
    pub columns: usize,
    /// Width each cell is laid out at.
    pub item_width: f32,
    /// Height each cell is laid out at.
    pub item_height: f32,
}

/// Solves the responsive column layout for the given container width.
///
/// 1. Estimate columns from the raw minimum width, floored at 1.
/// 2. Drop one column if dividing the gap-adjusted width evenly would
///    leave each cell narrower than the minimum. The minimum itself is
///    clamped to the container width first, so a container narrower
///    than one item still yields a single full-width column.
/// 3. Cell width is the floored even share of the remaining width;
///    cell height grows with width plus the content offset, but never
///    below the minimum height.
pub fn resolve_columns(config: &GridMeasureConfig, container_width: f32) -> ResolvedColumns {
    if !container_width.is_finite() || container_width <= 0.0 {
        log::warn!(
            "grid column solve with degenerate container width {}; using a single column",
            container_width
        );
        return ResolvedColumns {
            columns: 1,
            item_width: config.item_min_width.max(0.0),
            item_height: config
                .item_min_height
                .max(config.item_min_width + config.content_offset_height),
        };
    }

    let estimated = ((container_width / config.item_min_width).floor() as usize).max(1);
    let min_width = config.item_min_width.min(container_width);

    let gaps = estimated.saturating_sub(1) as f32 * config.gap;
    let per_column = (container_width - gaps) / estimated as f32;
    let columns = if per_column < min_width {
        estimated - 1
    } else {
        estimated
    }
    .max(1);

    let item_width = ((container_width - (columns - 1) as f32 * config.gap) / columns as f32).floor();
    let item_height = (item_width + config.content_offset_height).max(config.item_min_height);

    ResolvedColumns {
        columns,
        item_width,
        item_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_width: f32, gap: f32) -> GridMeasureConfig {
        GridMeasureConfig {
            item_min_width: min_width,
            item_min_height: 0.0,
            content_offset_height: 0.0,
            gap,
            ..GridMeasureConfig::default()
        }
    }

    #[test]
    fn test_three_columns_at_1000px() {
        // (1000 - 16) / 3 ≈ 328 >= 320, so the estimate of 3 holds.
        let resolved = resolve_columns(&config(320.0, 8.0), 1000.0);
        assert_eq!(resolved.columns, 3);
        assert_eq!(resolved.item_width, 328.0);
    }

    #[test]
    fn test_shrinks_when_gaps_undercut_minimum() {
        // 960 / 320 = 3 estimated, but (960 - 16) / 3 ≈ 314.7 < 320.
        let resolved = resolve_columns(&config(320.0, 8.0), 960.0);
        assert_eq!(resolved.columns, 2);
    }

    #[test]
    fn test_narrow_container_yields_single_column() {
        let resolved = resolve_columns(&config(320.0, 8.0), 240.0);
        assert_eq!(resolved.columns, 1);
        assert_eq!(resolved.item_width, 240.0);
    }

    #[test]
    fn test_height_tracks_width_plus_content_offset() {
        let mut cfg = config(320.0, 8.0);
        cfg.content_offset_height = 40.0;
        cfg.item_min_height = 100.0;
        let resolved = resolve_columns(&cfg, 1000.0);
        assert_eq!(resolved.item_height, resolved.item_width + 40.0);
    }

    #[test]
    fn test_height_never_below_minimum() {
        let mut cfg = config(100.0, 0.0);
        cfg.item_min_height = 400.0;
        let resolved = resolve_columns(&cfg, 300.0);
        assert_eq!(resolved.item_height, 400.0);
    }

    #[test]
    fn test_degenerate_width_falls_back_to_one_column() {
        let resolved = resolve_columns(&config(320.0, 8.0), 0.0);
        assert_eq!(resolved.columns, 1);
    }

    #[test]
    fn test_columns_at_least_one_for_any_width() {
        for width in [1.0_f32, 50.0, 319.0, 320.0, 321.0, 5000.0] {
            let resolved = resolve_columns(&config(320.0, 8.0), width);
            assert!(resolved.columns >= 1, "width {} gave zero columns", width);
        }
    }
}
