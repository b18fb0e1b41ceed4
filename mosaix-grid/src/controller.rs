//! Grid orchestration.
//!
//! The controller owns the item collection and every per-item tile, runs the
//! layout and visibility passes, and routes environment events (timers,
//! asset completions, clicks) to the right tile. All entry points take the
//! environment handle explicitly; the controller itself never reaches for
//! ambient state.

use std::collections::HashMap;

use mosaix_model::{GridLayout, ImageId, ImageItem, Page, ViewportState};

use crate::coalesce::RelayoutCoalescer;
use crate::config::GridOptions;
use crate::env::{GridEnv, NodeKey, NodeKeyAllocator, SurfaceEvent};
use crate::error::{GridError, SourceError};
use crate::layout::{LayoutParams, compute_layout};
use crate::tile::{AssetKind, Tile, TilePhase};
use crate::velocity::ScrollVelocityTracker;
use crate::visibility::{BufferHeights, TileIntent, select_visible};

/// Outputs reported to the embedder.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Size of the item collection backing the grid.
    TotalCount(usize),
    /// Number of currently mounted tiles whose full-resolution asset has
    /// finished loading.
    LoadedCount(usize),
    /// A click-watched tile was activated.
    ItemClicked(ImageId),
    /// A data-source fetch started or finished.
    Loading(bool),
    /// The data source failed; the grid kept its last valid state.
    SourceFailed(SourceError),
}

/// Progressive virtualized image grid.
///
/// Lifetimes of the moving parts: the item list is replaced wholesale via
/// [`ImageGrid::set_image_data`] (never mutated in place while enabled), the
/// layout is recomputed in full whenever the container width changes, and
/// tiles are mounted/unmounted per coalesced scroll/resize tick.
pub struct ImageGrid<T> {
    options: GridOptions<T>,
    items: Vec<ImageItem<T>>,
    tiles: Vec<Tile>,
    layout: GridLayout,
    intents: Vec<TileIntent>,
    viewport: ViewportState,
    velocity: ScrollVelocityTracker,
    coalescer: RelayoutCoalescer,
    alloc: NodeKeyAllocator,
    /// Routes node keys (container, placeholder, full image) back to items.
    key_index: HashMap<NodeKey, usize>,
    /// Routes deferred mount timers back to items.
    defer_index: HashMap<crate::env::CallbackHandle, usize>,
    container_width: f32,
    enabled: bool,
    dormant: bool,
    loaded_count: usize,
}

impl<T> std::fmt::Debug for ImageGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageGrid")
            .field("items", &self.items.len())
            .field("enabled", &self.enabled)
            .field("dormant", &self.dormant)
            .field("container_width", &self.container_width)
            .field("loaded_count", &self.loaded_count)
            .finish_non_exhaustive()
    }
}

impl<T> ImageGrid<T> {
    pub fn new(options: GridOptions<T>) -> Self {
        let velocity = ScrollVelocityTracker::new(
            options.tuning.velocity_samples,
            options.tuning.fast_scroll_threshold,
        );
        Self {
            options,
            items: Vec::new(),
            tiles: Vec::new(),
            layout: GridLayout::default(),
            intents: Vec::new(),
            viewport: ViewportState::new(),
            velocity,
            coalescer: RelayoutCoalescer::new(),
            alloc: NodeKeyAllocator::new(),
            key_index: HashMap::new(),
            defer_index: HashMap::new(),
            container_width: 0.0,
            enabled: false,
            dormant: false,
            loaded_count: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn tile_phase(&self, index: usize) -> Option<TilePhase> {
        self.tiles.get(index).map(Tile::phase)
    }

    /// Replace the item collection wholesale.
    ///
    /// The grid must be disabled first; live mutation is a checked error.
    /// Tiles still mounted from before the last `disable` are abandoned, not
    /// torn down; call [`ImageGrid::clear_image_data`] first when the old
    /// nodes should leave the surface.
    pub fn set_image_data(&mut self, items: Vec<ImageItem<T>>) -> Result<Vec<GridEvent>, GridError> {
        if self.enabled {
            return Err(GridError::MutateWhileEnabled);
        }
        if self.tiles.iter().any(Tile::is_live) {
            log::warn!("replacing image data while tiles are still mounted; abandoning their nodes");
        }

        self.tiles = std::iter::repeat_with(Tile::default)
            .take(items.len())
            .collect();
        self.items = items;
        self.layout = GridLayout::default();
        self.intents.clear();
        self.key_index.clear();
        self.defer_index.clear();
        self.loaded_count = 0;

        Ok(vec![
            GridEvent::TotalCount(self.items.len()),
            GridEvent::LoadedCount(0),
        ])
    }

    /// Compute the initial layout, run the first visibility pass, and start
    /// reacting to scroll/resize signals.
    ///
    /// A missing container degrades to a dormant no-op grid rather than a
    /// panic; a later `enable` retries.
    pub fn enable(&mut self, env: &mut dyn GridEnv) -> Vec<GridEvent> {
        if self.enabled {
            return Vec::new();
        }
        let Some(metrics) = env.metrics() else {
            log::warn!("grid container missing at enable; staying dormant");
            self.dormant = true;
            return Vec::new();
        };

        self.dormant = false;
        self.enabled = true;
        self.coalescer.enable();
        self.container_width = metrics.container_width;
        self.viewport.update_scroll(metrics.scroll_offset);
        self.viewport
            .update_geometry(metrics.container_top, metrics.viewport_height);

        self.relayout(env);
        let mut events = vec![GridEvent::TotalCount(self.items.len())];
        events.extend(self.visibility_pass(env));
        events
    }

    /// Stop reacting to scroll/resize signals. Mounted tiles stay on the
    /// surface; pending deferred mounts still complete.
    pub fn disable(&mut self, env: &mut dyn GridEnv) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.coalescer.teardown(env);
        self.velocity.reset();
    }

    /// Force-unmount every tile, reset the surface height, and drop the item
    /// collection.
    pub fn clear_image_data(&mut self, env: &mut dyn GridEnv) -> Vec<GridEvent> {
        for index in 0..self.tiles.len() {
            if self.tiles[index].is_live() {
                let removed = self.tiles[index].unmount(
                    env,
                    &mut self.alloc,
                    &self.items[index],
                    self.options.policies.decorator.as_mut(),
                );
                for key in removed {
                    self.key_index.remove(&key);
                }
            }
        }
        self.items.clear();
        self.tiles.clear();
        self.layout = GridLayout::default();
        self.intents.clear();
        self.key_index.clear();
        self.defer_index.clear();
        self.loaded_count = 0;
        env.set_surface_height(0.0);

        vec![GridEvent::TotalCount(0), GridEvent::LoadedCount(0)]
    }

    /// Report that a data-source fetch is starting.
    ///
    /// Pairs with [`ImageGrid::ingest_page`], which reports the end of the
    /// fetch; embedders forward both to their loading indicator.
    pub fn begin_loading(&mut self) -> Vec<GridEvent> {
        vec![GridEvent::Loading(true)]
    }

    /// Feed the outcome of a data-source fetch into the grid.
    ///
    /// Success replaces the item collection (grid must be disabled); failure
    /// is logged and reported while the grid keeps its last valid state.
    pub fn ingest_page(
        &mut self,
        result: Result<Page<T>, SourceError>,
    ) -> Result<Vec<GridEvent>, GridError> {
        match result {
            Ok(page) => {
                let mut events = self.set_image_data(page.items)?;
                events.push(GridEvent::Loading(false));
                Ok(events)
            }
            Err(err) => {
                log::error!("data source failed: {err}; keeping last grid state");
                Ok(vec![
                    GridEvent::Loading(false),
                    GridEvent::SourceFailed(err),
                ])
            }
        }
    }

    /// Handle one raw environment event.
    pub fn handle_event(&mut self, env: &mut dyn GridEnv, event: SurfaceEvent) -> Vec<GridEvent> {
        match event {
            SurfaceEvent::Scrolled => {
                if !self.enabled || self.dormant {
                    return Vec::new();
                }
                if let Some(metrics) = env.metrics() {
                    let now = env.now();
                    self.velocity.record(now, metrics.scroll_offset);
                }
                self.coalescer.signal(env);
                Vec::new()
            }
            SurfaceEvent::Resized => {
                if !self.enabled || self.dormant {
                    return Vec::new();
                }
                self.coalescer.signal(env);
                Vec::new()
            }
            SurfaceEvent::TimerFired(handle) => {
                if self.coalescer.on_timer(handle) {
                    return self.tick(env);
                }
                if let Some(index) = self.defer_index.remove(&handle) {
                    return self.complete_deferred_mount(env, index);
                }
                Vec::new()
            }
            SurfaceEvent::AssetLoaded(key) => self.on_asset_loaded(env, key),
            SurfaceEvent::AssetFailed(key) => {
                // Per-item failures stay silent: no loaded marker, no retry.
                if let Some(&index) = self.key_index.get(&key) {
                    log::debug!("asset load failed for item {index}");
                }
                Vec::new()
            }
            SurfaceEvent::Clicked(key) => self.on_clicked(key),
        }
    }

    /// One coalesced layout+visibility pass.
    fn tick(&mut self, env: &mut dyn GridEnv) -> Vec<GridEvent> {
        let Some(metrics) = env.metrics() else {
            return Vec::new();
        };
        let now = env.now();
        self.velocity.settle(now);
        self.viewport.update_scroll(metrics.scroll_offset);
        self.viewport
            .update_geometry(metrics.container_top, metrics.viewport_height);

        // Only a width change invalidates the layout; visibility always reruns.
        if (metrics.container_width - self.container_width).abs() > f32::EPSILON {
            self.container_width = metrics.container_width;
            self.relayout(env);
        }
        self.visibility_pass(env)
    }

    fn relayout(&mut self, env: &mut dyn GridEnv) {
        let params = LayoutParams {
            container_width: self.container_width,
            gap: self.options.tuning.gap_px,
            min_row_aspect: &*self.options.policies.min_row_aspect,
        };
        let layout = compute_layout(&self.items, &params);
        self.layout = layout;
        env.set_surface_height(self.layout.total_height);

        for (tile, frame) in self.tiles.iter().zip(&self.layout.boxes) {
            if tile.is_live() {
                tile.apply_frame(env, *frame);
            }
        }
    }

    fn visibility_pass(&mut self, env: &mut dyn GridEnv) -> Vec<GridEvent> {
        let buffers = BufferHeights {
            primary: self.options.tuning.primary_buffer_px,
            secondary: self.options.tuning.secondary_buffer_px,
        };
        self.intents = select_visible(&self.layout.boxes, &self.viewport, buffers);

        let watch_clicks = self.options.tuning.with_click_events;
        let mut loaded_changed = false;

        for index in 0..self.tiles.len() {
            let intent = self
                .intents
                .get(index)
                .copied()
                .unwrap_or(TileIntent::Hide);
            match intent {
                TileIntent::Show(_) => {
                    let frame = self.layout.boxes[index];
                    if let Some((container, defer)) =
                        self.tiles[index].mount(env, &mut self.alloc, frame, watch_clicks)
                    {
                        self.key_index.insert(container, index);
                        self.defer_index.insert(defer, index);
                    }
                }
                TileIntent::Hide => {
                    if !self.tiles[index].is_live() {
                        continue;
                    }
                    if self.tiles[index].full_loaded() {
                        self.loaded_count -= 1;
                        loaded_changed = true;
                    }
                    let removed = self.tiles[index].unmount(
                        env,
                        &mut self.alloc,
                        &self.items[index],
                        self.options.policies.decorator.as_mut(),
                    );
                    for key in removed {
                        self.key_index.remove(&key);
                    }
                    self.defer_index.retain(|_, owner| *owner != index);
                }
            }
        }

        if loaded_changed {
            vec![GridEvent::LoadedCount(self.loaded_count)]
        } else {
            Vec::new()
        }
    }

    /// The 100ms defer elapsed for `index`: create the image sub-nodes if
    /// the tile is still wanted, or push the work out again during a fling.
    fn complete_deferred_mount(&mut self, env: &mut dyn GridEnv, index: usize) -> Vec<GridEvent> {
        let Some(TileIntent::Show(priority)) = self.intents.get(index).copied() else {
            // No longer wanted; the hide pass has already torn it down.
            return Vec::new();
        };

        // The last scroll signal may be long gone by the time a postponed
        // defer fires; settle against current time before classifying.
        let now = env.now();
        self.velocity.settle(now);
        if self.velocity.is_fast() {
            if let Some(handle) = self.tiles[index].postpone(env) {
                self.defer_index.insert(handle, index);
            }
            return Vec::new();
        }

        let Some(frame) = self.layout.boxes.get(index).copied() else {
            return Vec::new();
        };
        if let Some((placeholder, full)) = self.tiles[index].complete_mount(
            env,
            &mut self.alloc,
            &self.items[index],
            frame,
            &mut self.options,
            priority,
            self.container_width,
        ) {
            self.key_index.insert(placeholder, index);
            self.key_index.insert(full, index);
        }
        Vec::new()
    }

    fn on_asset_loaded(&mut self, env: &mut dyn GridEnv, key: NodeKey) -> Vec<GridEvent> {
        // Stale keys (unmounted before the load finished) fall out here.
        let Some(&index) = self.key_index.get(&key) else {
            return Vec::new();
        };
        match self.tiles[index].note_asset_loaded(key) {
            Some(AssetKind::Placeholder) => {
                env.mark_loaded(key);
                Vec::new()
            }
            Some(AssetKind::Full) => {
                env.mark_loaded(key);
                self.loaded_count += 1;
                vec![GridEvent::LoadedCount(self.loaded_count)]
            }
            None => Vec::new(),
        }
    }

    fn on_clicked(&self, key: NodeKey) -> Vec<GridEvent> {
        if !self.options.tuning.with_click_events {
            return Vec::new();
        }
        match self.key_index.get(&key) {
            Some(&index) if self.tiles[index].container() == Some(key) => {
                vec![GridEvent::ItemClicked(self.items[index].id.clone())]
            }
            _ => Vec::new(),
        }
    }
}
