//! End-to-end pagination flow: initial load, threshold-triggered
//! fetches, failure recovery, and query switching.

use trellis_grid::{FetchError, GridSpec, GridSurface, LoadError, QueryIdentity};
use trellis_testing::{expect_ready, FetchScript, GridRobot, PendingFetcher};

fn spec() -> GridSpec {
    GridSpec::new()
        .item_min_width(320.0)
        .item_min_height(0.0)
        .content_offset_height(32.0)
        .gap(8.0)
        .skeleton_count(4)
}

#[test]
fn initial_load_renders_first_page() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let (fetcher, log) = FetchScript::new()
        .page((0..30).collect())
        .into_fetcher();
    robot.set_query(QueryIdentity::new("maps"), fetcher);

    // The query install alone kicks off page 0.
    assert_eq!(log.request_count(), 1);
    robot.advance(16);

    let ready = expect_ready(robot.surface(|item, _| *item));
    assert_eq!(robot.state().item_count(), 30);
    assert!(!ready.end_of_content);
    assert!(ready.pagination_error.is_none());
}

#[test]
fn at_most_one_fetch_in_flight() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let pending: PendingFetcher<u32> = PendingFetcher::new();
    robot.set_query(QueryIdentity::new("maps"), pending.fetcher());
    assert_eq!(pending.request_count(), 1);

    // Hammer the scroll while page 0 is still outstanding; nothing may
    // start a second fetch.
    for _ in 0..5 {
        robot.scroll_to(50_000.0);
        robot.advance(250);
    }
    assert_eq!(pending.request_count(), 1);
    assert!(robot.state().is_fetching());

    pending.resolve(0, Ok((0..6).collect()));
    robot.advance(16);
    assert_eq!(robot.state().item_count(), 6);
}

#[test]
fn scrolling_near_bottom_fetches_next_page() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let (fetcher, log) = FetchScript::new()
        .page((0..30).collect())
        .page((30..60).collect())
        .into_fetcher();
    robot.set_query(QueryIdentity::new("maps"), fetcher);
    robot.advance(16);
    assert_eq!(log.request_count(), 1);

    // Far from the bottom: no fetch.
    robot.scroll_to(100.0);
    robot.advance(250);
    assert_eq!(log.request_count(), 1);

    // Within the threshold (content is 3672px tall): exactly one more.
    robot.scroll_to(2500.0);
    robot.advance(16);
    assert_eq!(log.requested_pages(), vec![0, 1]);
    assert_eq!(robot.state().item_count(), 60);
}

#[test]
fn skeleton_tail_shows_while_fetching_more() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let pending: PendingFetcher<u32> = PendingFetcher::new();
    robot.set_query(QueryIdentity::new("maps"), pending.fetcher());
    pending.resolve(0, Ok((0..30).collect()));
    robot.advance(16);

    robot.scroll_to(2500.0);
    assert!(robot.state().is_fetching());

    let ready = expect_ready(robot.surface(|item, _| *item));
    assert!(ready.fetching_more);
    assert_eq!(ready.skeleton_tail, 4);
    assert!(trellis_testing::mounted_skeletons(&ready) > 0);

    // The placeholders disappear once the page lands.
    pending.resolve(1, Ok((30..60).collect()));
    robot.advance(16);
    let ready = expect_ready(robot.surface(|item, _| *item));
    assert!(!ready.fetching_more);
    assert_eq!(trellis_testing::mounted_skeletons(&ready), 0);
}

#[test]
fn empty_page_marks_end_of_content() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let (fetcher, log) = FetchScript::new()
        .page((0..30).collect())
        .end()
        .into_fetcher();
    robot.set_query(QueryIdentity::new("maps"), fetcher);
    robot.advance(16);

    robot.scroll_to(100_000.0);
    robot.advance(16);

    let ready = expect_ready(robot.surface(|item, _| *item));
    assert!(ready.end_of_content);
    assert!(!robot.state().has_next_page());

    // Exhausted: further scrolling never asks the server again.
    robot.scroll_to(0.0);
    robot.advance(250);
    robot.scroll_to(100_000.0);
    robot.advance(250);
    assert_eq!(log.request_count(), 2);
}

#[test]
fn pagination_failure_preserves_items_and_retries_on_scroll() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let (fetcher, log) = FetchScript::new()
        .page((0..30).collect())
        .error(FetchError::Transport("connection reset".into()))
        .page((30..60).collect())
        .end()
        .into_fetcher();
    robot.set_query(QueryIdentity::new("maps"), fetcher);
    robot.advance(16);

    // Page 1 fails.
    robot.scroll_to(2500.0);
    robot.advance(16);
    let ready = expect_ready(robot.surface(|item, _| *item));
    assert_eq!(robot.state().item_count(), 30);
    assert!(matches!(
        ready.pagination_error,
        Some(LoadError::Pagination { page: 1, .. })
    ));
    assert!(robot.state().has_next_page());

    // Idle ticks do not retry on their own.
    robot.advance(250);
    robot.advance(250);
    assert_eq!(log.request_count(), 2);

    // The next qualifying scroll retries the same page.
    robot.scroll_to(2500.0);
    robot.advance(16);
    assert_eq!(robot.state().item_count(), 60);
    let ready = expect_ready(robot.surface(|item, _| *item));
    assert!(ready.pagination_error.is_none());
    assert_eq!(log.requested_pages(), vec![0, 1, 1]);
}

#[test]
fn initial_failure_blocks_until_retried() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let (fetcher, _log) = FetchScript::new()
        .error(FetchError::Transport("offline".into()))
        .page((0..10).collect())
        .into_fetcher();
    robot.set_query(QueryIdentity::new("maps"), fetcher);
    robot.advance(16);

    match robot.surface(|item, _| *item) {
        GridSurface::Error { error } => assert!(error.is_blocking()),
        other => panic!("expected blocking error, got {other:?}"),
    }

    // A scroll event near the (empty) bottom retries page 0.
    robot.scroll_to(10.0);
    robot.advance(16);
    expect_ready(robot.surface(|item, _| *item));
    assert_eq!(robot.state().item_count(), 10);
}

#[test]
fn switching_query_discards_stale_response() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let pending: PendingFetcher<u32> = PendingFetcher::new();
    robot.set_query(
        QueryIdentity::new("maps").with_param("search", "a"),
        pending.fetcher(),
    );
    assert_eq!(pending.request_count(), 1);

    // Switch to B while A's page 0 is still in flight.
    let (fetcher_b, _log_b) = FetchScript::new()
        .page((100..130).collect())
        .into_fetcher();
    robot.set_query(
        QueryIdentity::new("maps").with_param("search", "b"),
        fetcher_b,
    );
    robot.advance(16);
    assert_eq!(robot.state().item_count(), 30);

    // A's response arrives late; it must not leak into B's items.
    pending.resolve(0, Ok(vec![900, 901, 902]));
    robot.advance(16);
    assert_eq!(robot.state().item_count(), 30);
    let ready = expect_ready(robot.surface(|item, _| *item));
    let first = ready.cells.first().expect("mounted cells");
    match &first.slot {
        trellis_grid::GridSlot::Item(value) => assert_eq!(*value, 100),
        other => panic!("expected item, got {other:?}"),
    }
}

#[test]
fn switching_query_restarts_from_page_zero() {
    let robot: GridRobot<u32> = GridRobot::new(spec(), 1000.0, 800.0);
    let (fetcher_a, log_a) = FetchScript::new()
        .page((0..30).collect())
        .page((30..60).collect())
        .into_fetcher();
    robot.set_query(QueryIdentity::new("maps"), fetcher_a);
    robot.advance(16);
    robot.scroll_to(2500.0);
    robot.advance(16);
    assert_eq!(log_a.requested_pages(), vec![0, 1]);
    assert!(robot.state().scroll_top() > 0.0);

    let (fetcher_b, log_b) = FetchScript::new()
        .page((500..530).collect())
        .into_fetcher();
    robot.set_query(
        QueryIdentity::new("maps").with_param("sort", "new"),
        fetcher_b,
    );
    assert_eq!(robot.state().scroll_top(), 0.0);
    assert_eq!(log_b.requested_pages(), vec![0]);
    robot.advance(16);
    assert_eq!(robot.state().item_count(), 30);
}
