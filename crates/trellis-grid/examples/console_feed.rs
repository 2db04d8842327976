//! Minimal headless embedding: drives the grid with a synthetic page
//! source and prints each frame's mounted window.
//!
//! Run with `cargo run -p trellis-grid --example console_feed`.

use std::time::Duration;

use trellis_grid::{GridSpec, GridState, GridSurface, PageRequest, QueryIdentity};
use web_time::Instant;

fn main() {
    let spec = GridSpec::new()
        .item_min_width(240.0)
        .item_min_height(0.0)
        .content_offset_height(40.0)
        .gap(8.0)
        .skeleton_count(4);
    let state: GridState<String> = GridState::new(spec);
    state.notify_resized(1024.0, 768.0);

    // Four pages of 24 items, then the terminal empty page.
    state.set_query(
        QueryIdentity::new("maps").with_param("sort", "downloads"),
        Box::new(|request: PageRequest| {
            let page: Vec<String> = if request.page_index < 4 {
                let start = request.page_index * 24;
                (start..start + 24).map(|i| format!("Map #{i}")).collect()
            } else {
                Vec::new()
            };
            Box::pin(std::future::ready(Ok(page)))
        }),
    );

    let mut now = Instant::now();
    for step in 0..12 {
        now += Duration::from_millis(220);
        state.notify_scroll(step as f32 * 600.0, now);
        state.tick(now);

        match state.render_pass(|item, _| item.clone()) {
            GridSurface::Ready(ready) => println!(
                "scroll={:>6.0}  mounted {:>2} cells [{:>3}..{:>3}) of {:>3} items{}",
                ready.frame.scroll_top,
                ready.cells.len(),
                ready.frame.start_index,
                ready.frame.end_index,
                state.item_count(),
                if ready.end_of_content { "  <end>" } else { "" },
            ),
            GridSurface::Loading { skeletons } => println!("loading ({skeletons} placeholders)"),
            GridSurface::Empty => println!("no results"),
            GridSurface::Error { error } => println!("error: {error}"),
        }
    }
}
