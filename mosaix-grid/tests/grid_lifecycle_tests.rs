//! Tile lifecycle integration tests
//!
//! Requirements covered:
//! - Mounting attaches the container immediately but defers image work
//! - mount() is idempotent: repeat passes never duplicate container nodes
//! - unmount() before the defer elapses never creates sub-nodes
//! - Blur-up: placeholder and full asset get independent loaded markers
//! - Late asset completions for torn-down tiles are no-ops
//! - Decorator overlays ride the same mount/unmount sequence

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{TestEnv, create_test_items, default_metrics, fire_all, test_options};
use mosaix_grid::{
    DecorateContext, ElementKind, GridEvent, ImageGrid, SurfaceEvent, TileDecorator, TilePhase,
};
use mosaix_model::ImageItem;

#[test]
fn mount_attaches_container_and_defers_image_work() {
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options());
    grid.set_image_data(create_test_items(&[1.5, 1.5, 1.5])).unwrap();
    grid.enable(&mut env);

    assert_eq!(env.live_count(ElementKind::TileContainer), 3);
    assert_eq!(env.live_count(ElementKind::PlaceholderImage), 0);
    assert_eq!(env.live_count(ElementKind::FullImage), 0);
    assert_eq!(grid.tile_phase(0), Some(TilePhase::Mounting));

    // One deferred timer per tile.
    assert_eq!(env.scheduled_count(), 3);

    fire_all(&mut grid, &mut env);
    assert_eq!(env.live_count(ElementKind::PlaceholderImage), 3);
    assert_eq!(env.live_count(ElementKind::FullImage), 3);
    assert_eq!(grid.tile_phase(0), Some(TilePhase::Mounted));
}

#[test]
fn repeat_visibility_passes_never_duplicate_containers() {
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options());
    grid.set_image_data(create_test_items(&[1.5, 1.5, 1.5])).unwrap();
    grid.enable(&mut env);

    let defers = env.take_scheduled();
    assert_eq!(defers.len(), 3);

    // A scroll tick while tiles are still Mounting re-evaluates visibility;
    // mount() on a live tile must be a no-op.
    env.set_scroll_offset(10.0);
    grid.handle_event(&mut env, SurfaceEvent::Scrolled);
    for handle in env.take_scheduled() {
        grid.handle_event(&mut env, SurfaceEvent::TimerFired(handle));
    }

    assert_eq!(env.live_count(ElementKind::TileContainer), 3);
    // No replacement defer timers were scheduled for already-live tiles.
    assert_eq!(env.scheduled_count(), 0);

    for handle in defers {
        grid.handle_event(&mut env, SurfaceEvent::TimerFired(handle));
    }
    assert_eq!(env.live_count(ElementKind::PlaceholderImage), 3);
}

#[test]
fn unmount_before_defer_never_creates_sub_nodes() {
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options());
    grid.set_image_data(create_test_items(&[1.5])).unwrap();
    grid.enable(&mut env);

    let defers = env.take_scheduled();
    assert_eq!(env.live_count(ElementKind::TileContainer), 1);

    // Scroll far past the grid before the 100ms defer elapses.
    env.set_scroll_offset(50_000.0);
    grid.handle_event(&mut env, SurfaceEvent::Scrolled);
    for handle in env.take_scheduled() {
        grid.handle_event(&mut env, SurfaceEvent::TimerFired(handle));
    }

    assert_eq!(env.live_count(ElementKind::TileContainer), 0);
    assert_eq!(grid.tile_phase(0), Some(TilePhase::Absent));
    // The defer was cancelled; firing its stale handle anyway is a no-op.
    assert!(!env.cancelled.is_empty());
    for handle in defers {
        grid.handle_event(&mut env, SurfaceEvent::TimerFired(handle));
    }
    assert_eq!(env.live_count(ElementKind::PlaceholderImage), 0);
    assert_eq!(env.live_count(ElementKind::FullImage), 0);
}

#[test]
fn blur_up_markers_are_independent_and_loaded_count_tracks_full_assets() {
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options());
    grid.set_image_data(create_test_items(&[1.5])).unwrap();
    grid.enable(&mut env);
    fire_all(&mut grid, &mut env);

    let placeholder = env.live_keys(ElementKind::PlaceholderImage)[0];
    let full = env.live_keys(ElementKind::FullImage)[0];

    let events = grid.handle_event(&mut env, SurfaceEvent::AssetLoaded(placeholder));
    assert!(events.is_empty(), "placeholder load is not a loaded item");
    assert!(env.commands.contains(&common::Command::MarkLoaded(placeholder)));

    let events = grid.handle_event(&mut env, SurfaceEvent::AssetLoaded(full));
    assert_eq!(events, vec![GridEvent::LoadedCount(1)]);

    // Duplicate completion events change nothing.
    let events = grid.handle_event(&mut env, SurfaceEvent::AssetLoaded(full));
    assert!(events.is_empty());
    assert_eq!(grid.loaded_count(), 1);
}

#[test]
fn late_asset_completion_after_unmount_is_a_no_op() {
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options());
    grid.set_image_data(create_test_items(&[1.5])).unwrap();
    grid.enable(&mut env);
    fire_all(&mut grid, &mut env);

    let full = env.live_keys(ElementKind::FullImage)[0];

    // Scroll away; the tile tears down and clears its sources.
    env.set_scroll_offset(50_000.0);
    grid.handle_event(&mut env, SurfaceEvent::Scrolled);
    fire_all(&mut grid, &mut env);
    assert!(env.commands.contains(&common::Command::ClearSource(full)));
    assert!(!env.is_live(full));

    // The slow network response arrives anyway.
    let marks_before = env
        .commands
        .iter()
        .filter(|c| matches!(c, common::Command::MarkLoaded(_)))
        .count();
    let events = grid.handle_event(&mut env, SurfaceEvent::AssetLoaded(full));
    assert!(events.is_empty());
    let marks_after = env
        .commands
        .iter()
        .filter(|c| matches!(c, common::Command::MarkLoaded(_)))
        .count();
    assert_eq!(marks_before, marks_after);
}

#[test]
fn asset_failure_leaves_tile_unmarked_without_events() {
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options());
    grid.set_image_data(create_test_items(&[1.5])).unwrap();
    grid.enable(&mut env);
    fire_all(&mut grid, &mut env);

    let full = env.live_keys(ElementKind::FullImage)[0];
    let events = grid.handle_event(&mut env, SurfaceEvent::AssetFailed(full));
    assert!(events.is_empty());
    assert!(!env.commands.contains(&common::Command::MarkLoaded(full)));
    assert_eq!(grid.loaded_count(), 0);
}

#[test]
fn thumbnail_builder_falls_back_to_image_builder() {
    let mut env = TestEnv::new(default_metrics());
    let options = test_options()
        .url_for_thumbnail(|item, w, h| format!("https://thumb.test/{}/{w}x{h}", item.id));
    let mut grid = ImageGrid::new(options);
    grid.set_image_data(create_test_items(&[2.0])).unwrap();
    grid.enable(&mut env);
    fire_all(&mut grid, &mut env);

    let placeholder = env.live_keys(ElementKind::PlaceholderImage)[0];
    let full = env.live_keys(ElementKind::FullImage)[0];
    assert!(env.sources_for(placeholder)[0].starts_with("https://thumb.test/img-0/"));
    assert!(env.sources_for(full)[0].starts_with("https://img.test/img-0/"));
}

#[test]
fn click_events_report_item_ids_only_when_enabled() {
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options().with_click_events(true));
    grid.set_image_data(create_test_items(&[1.5, 1.0])).unwrap();
    grid.enable(&mut env);
    fire_all(&mut grid, &mut env);

    let container = env.live_keys(ElementKind::TileContainer)[1];
    let events = grid.handle_event(&mut env, SurfaceEvent::Clicked(container));
    assert_eq!(events.len(), 1);
    match &events[0] {
        GridEvent::ItemClicked(id) => assert_eq!(id.as_str(), "img-1"),
        other => panic!("unexpected event {other:?}"),
    }

    // Clicking an image sub-node is not an item click.
    let placeholder = env.live_keys(ElementKind::PlaceholderImage)[0];
    assert!(grid.handle_event(&mut env, SurfaceEvent::Clicked(placeholder)).is_empty());
}

#[test]
fn clicks_are_ignored_when_not_configured() {
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options());
    grid.set_image_data(create_test_items(&[1.5])).unwrap();
    grid.enable(&mut env);
    fire_all(&mut grid, &mut env);

    assert!(!env
        .commands
        .iter()
        .any(|c| matches!(c, common::Command::WatchClicks(_, true))));

    let container = env.live_keys(ElementKind::TileContainer)[0];
    assert!(grid.handle_event(&mut env, SurfaceEvent::Clicked(container)).is_empty());
}

struct CaptionDecorator {
    mounts: Rc<RefCell<usize>>,
    unmounts: Rc<RefCell<usize>>,
}

impl TileDecorator<()> for CaptionDecorator {
    fn decorate_mount(&mut self, ctx: &mut DecorateContext<'_>, _item: &ImageItem<()>) {
        ctx.add_overlay("caption");
        *self.mounts.borrow_mut() += 1;
    }

    fn decorate_unmount(&mut self, ctx: &mut DecorateContext<'_>, _item: &ImageItem<()>) {
        ctx.remove_overlay("caption");
        *self.unmounts.borrow_mut() += 1;
    }
}

#[test]
fn decorator_overlays_ride_the_mount_unmount_sequence() {
    let mounts = Rc::new(RefCell::new(0));
    let unmounts = Rc::new(RefCell::new(0));
    let mut env = TestEnv::new(default_metrics());
    let mut grid = ImageGrid::new(test_options().decorator(CaptionDecorator {
        mounts: Rc::clone(&mounts),
        unmounts: Rc::clone(&unmounts),
    }));
    grid.set_image_data(create_test_items(&[1.5])).unwrap();
    grid.enable(&mut env);
    fire_all(&mut grid, &mut env);

    assert_eq!(*mounts.borrow(), 1);
    assert_eq!(env.live_count(ElementKind::Overlay), 1);

    env.set_scroll_offset(50_000.0);
    grid.handle_event(&mut env, SurfaceEvent::Scrolled);
    fire_all(&mut grid, &mut env);

    assert_eq!(*unmounts.borrow(), 1);
    assert_eq!(env.live_count(ElementKind::Overlay), 0);
    assert_eq!(env.live_count(ElementKind::TileContainer), 0);
}
