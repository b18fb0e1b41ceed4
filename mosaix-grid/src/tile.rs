//! Progressive tile lifecycle.
//!
//! Each grid item owns a [`Tile`]: a container node, a low-res blur-up
//! placeholder and a full-resolution image, created in two stages. Mounting
//! attaches the container immediately but defers sub-node creation by
//! [`MOUNT_DEFER_DELAY`], so a fast-scrolling user who unmounts right away
//! never pays for image work. Asset completions are guarded by lifecycle
//! state: a late load event for a torn-down tile is a detected no-op.

use std::collections::HashMap;
use std::time::Duration;

use mosaix_model::{ImageItem, LayoutBox};

use crate::config::GridOptions;
use crate::env::{
    AssetPriority, CallbackHandle, ElementKind, GridEnv, NodeKey, NodeKeyAllocator,
};

/// Delay between container attach and placeholder/full-image creation.
pub const MOUNT_DEFER_DELAY: Duration = Duration::from_millis(100);

/// Well-known names in the tile's sub-element map.
pub const SUB_CONTAINER: &str = "container";
pub const SUB_PLACEHOLDER: &str = "placeholder";
pub const SUB_FULL_IMAGE: &str = "full-image";

/// Lifecycle phase of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TilePhase {
    #[default]
    Absent,
    /// Container attached, sub-node creation deferred.
    Mounting,
    Mounted,
    /// Synchronous teardown in progress.
    Unmounting,
}

/// Which image asset a load completion belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Placeholder,
    Full,
}

/// Per-item node state machine.
///
/// Sub-elements live in an explicit string-keyed map (the two built-in
/// entries plus whatever a [`TileDecorator`] adds) with defined insertion
/// and removal; there is no dynamic property bag.
#[derive(Debug, Default)]
pub struct Tile {
    phase: TilePhase,
    nodes: HashMap<String, NodeKey>,
    defer: Option<CallbackHandle>,
    placeholder_loaded: bool,
    full_loaded: bool,
}

impl Tile {
    pub fn phase(&self) -> TilePhase {
        self.phase
    }

    pub fn is_live(&self) -> bool {
        matches!(self.phase, TilePhase::Mounting | TilePhase::Mounted)
    }

    pub fn node(&self, name: &str) -> Option<NodeKey> {
        self.nodes.get(name).copied()
    }

    pub fn container(&self) -> Option<NodeKey> {
        self.node(SUB_CONTAINER)
    }

    pub fn full_loaded(&self) -> bool {
        self.full_loaded
    }

    /// `Absent -> Mounting`: attach the container now, defer image work.
    ///
    /// Returns the container key and defer handle, or `None` when the tile
    /// is already live (repeat `mount` calls are no-ops).
    pub fn mount(
        &mut self,
        env: &mut dyn GridEnv,
        alloc: &mut NodeKeyAllocator,
        frame: LayoutBox,
        watch_clicks: bool,
    ) -> Option<(NodeKey, CallbackHandle)> {
        if self.phase != TilePhase::Absent {
            return None;
        }

        let container = alloc.allocate();
        env.create_element(container, ElementKind::TileContainer);
        env.set_frame(container, frame);
        env.set_fade_transition(container, true);
        env.attach_element(None, container);
        if watch_clicks {
            env.watch_clicks(container, true);
        }

        let defer = env.schedule_timeout(MOUNT_DEFER_DELAY);
        self.nodes.insert(SUB_CONTAINER.to_string(), container);
        self.defer = Some(defer);
        self.phase = TilePhase::Mounting;
        Some((container, defer))
    }

    /// `Mounting -> Mounted` once the defer delay elapsed and the tile is
    /// still wanted: create placeholder and full-resolution nodes and point
    /// them at their assets. Returns the two new keys.
    pub fn complete_mount<T>(
        &mut self,
        env: &mut dyn GridEnv,
        alloc: &mut NodeKeyAllocator,
        item: &ImageItem<T>,
        frame: LayoutBox,
        options: &mut GridOptions<T>,
        priority: AssetPriority,
        container_width: f32,
    ) -> Option<(NodeKey, NodeKey)> {
        if self.phase != TilePhase::Mounting {
            return None;
        }
        let Some(&container) = self.nodes.get(SUB_CONTAINER) else {
            return None;
        };
        self.defer = None;

        // Children are framed relative to the container.
        let child_frame = LayoutBox {
            width: frame.width,
            height: frame.height,
            x: 0.0,
            y: 0.0,
        };

        let placeholder = alloc.allocate();
        env.create_element(placeholder, ElementKind::PlaceholderImage);
        env.set_frame(placeholder, child_frame);
        env.attach_element(Some(container), placeholder);
        let thumb_w = options.tuning.thumbnail_size_px.round().max(1.0) as u32;
        let thumb_h = (options.tuning.thumbnail_size_px / item.aspect_ratio)
            .round()
            .max(1.0) as u32;
        let thumb_url = match &options.policies.url_for_thumbnail {
            Some(builder) => builder(item, thumb_w, thumb_h),
            None => (options.policies.url_for_image)(item, thumb_w, thumb_h),
        };
        env.set_source(placeholder, &thumb_url, (thumb_w, thumb_h), priority);

        let full = alloc.allocate();
        env.create_element(full, ElementKind::FullImage);
        env.set_frame(full, child_frame);
        env.attach_element(Some(container), full);
        let full_h = (options.policies.image_size)(container_width).row_height();
        let full_w = (full_h as f32 * item.aspect_ratio).round().max(1.0) as u32;
        let full_url = (options.policies.url_for_image)(item, full_w, full_h);
        env.set_source(full, &full_url, (full_w, full_h), priority);

        self.nodes.insert(SUB_PLACEHOLDER.to_string(), placeholder);
        self.nodes.insert(SUB_FULL_IMAGE.to_string(), full);
        self.phase = TilePhase::Mounted;

        if let Some(decorator) = options.policies.decorator.as_mut() {
            let mut ctx = DecorateContext {
                env: &mut *env,
                alloc,
                container,
                nodes: &mut self.nodes,
            };
            decorator.decorate_mount(&mut ctx, item);
        }

        Some((placeholder, full))
    }

    /// Push the deferred image work out by another delay (used while the
    /// user is fling-scrolling). Returns the replacement handle.
    pub fn postpone(&mut self, env: &mut dyn GridEnv) -> Option<CallbackHandle> {
        if self.phase != TilePhase::Mounting {
            return None;
        }
        let handle = env.schedule_timeout(MOUNT_DEFER_DELAY);
        self.defer = Some(handle);
        Some(handle)
    }

    /// Tear the tile down. From `Mounting` this cancels the deferred image
    /// work (sub-nodes are never created); from `Mounted` it runs the
    /// synchronous `Unmounting` cleanup. Returns every removed node key so
    /// the controller can drop its routing entries.
    pub fn unmount<T>(
        &mut self,
        env: &mut dyn GridEnv,
        alloc: &mut NodeKeyAllocator,
        item: &ImageItem<T>,
        mut decorator: Option<&mut Box<dyn TileDecorator<T>>>,
    ) -> Vec<NodeKey> {
        match self.phase {
            TilePhase::Absent | TilePhase::Unmounting => Vec::new(),
            TilePhase::Mounting => {
                if let Some(handle) = self.defer.take() {
                    env.cancel_timeout(handle);
                }
                let mut removed = Vec::with_capacity(1);
                if let Some(container) = self.nodes.remove(SUB_CONTAINER) {
                    env.watch_clicks(container, false);
                    env.remove_element(container);
                    removed.push(container);
                }
                self.nodes.clear();
                self.phase = TilePhase::Absent;
                removed
            }
            TilePhase::Mounted => {
                self.phase = TilePhase::Unmounting;

                if let Some(decorator) = decorator.as_deref_mut() {
                    if let Some(container) = self.nodes.get(SUB_CONTAINER).copied() {
                        let mut ctx = DecorateContext {
                            env: &mut *env,
                            alloc: &mut *alloc,
                            container,
                            nodes: &mut self.nodes,
                        };
                        decorator.decorate_unmount(&mut ctx, item);
                    }
                }

                // Sources are cleared before removal; a late completion is
                // dropped by the phase guard, not by request cancellation.
                for name in [SUB_PLACEHOLDER, SUB_FULL_IMAGE] {
                    if let Some(&key) = self.nodes.get(name) {
                        env.clear_source(key);
                    }
                }

                let container = self.nodes.remove(SUB_CONTAINER);
                let mut removed: Vec<NodeKey> = Vec::with_capacity(self.nodes.len() + 1);
                for (_, key) in self.nodes.drain() {
                    env.remove_element(key);
                    removed.push(key);
                }
                if let Some(container) = container {
                    env.watch_clicks(container, false);
                    env.remove_element(container);
                    removed.push(container);
                }

                self.placeholder_loaded = false;
                self.full_loaded = false;
                self.phase = TilePhase::Absent;
                removed
            }
        }
    }

    /// Re-apply frames after a relayout without touching lifecycle state.
    pub fn apply_frame(&self, env: &mut dyn GridEnv, frame: LayoutBox) {
        if let Some(&container) = self.nodes.get(SUB_CONTAINER) {
            env.set_frame(container, frame);
        }
        let child_frame = LayoutBox {
            width: frame.width,
            height: frame.height,
            x: 0.0,
            y: 0.0,
        };
        for name in [SUB_PLACEHOLDER, SUB_FULL_IMAGE] {
            if let Some(&key) = self.nodes.get(name) {
                env.set_frame(key, child_frame);
            }
        }
    }

    /// Guarded load-completion handler. Returns the asset kind on the first
    /// completion of a still-mounted asset; anything else (stale key, torn
    /// down tile, repeat event) is a no-op.
    pub fn note_asset_loaded(&mut self, key: NodeKey) -> Option<AssetKind> {
        if self.phase != TilePhase::Mounted {
            return None;
        }
        if self.node(SUB_PLACEHOLDER) == Some(key) && !self.placeholder_loaded {
            self.placeholder_loaded = true;
            return Some(AssetKind::Placeholder);
        }
        if self.node(SUB_FULL_IMAGE) == Some(key) && !self.full_loaded {
            self.full_loaded = true;
            return Some(AssetKind::Full);
        }
        None
    }
}

/// Mount/unmount-time surface access handed to decorators.
///
/// Overlays created here land in the same string-keyed sub-element map as
/// the built-in nodes, so base teardown removes anything a decorator leaves
/// behind.
pub struct DecorateContext<'a> {
    env: &'a mut dyn GridEnv,
    alloc: &'a mut NodeKeyAllocator,
    container: NodeKey,
    nodes: &'a mut HashMap<String, NodeKey>,
}

impl std::fmt::Debug for DecorateContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecorateContext")
            .field("container", &self.container)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

impl DecorateContext<'_> {
    pub fn container(&self) -> NodeKey {
        self.container
    }

    pub fn node(&self, name: &str) -> Option<NodeKey> {
        self.nodes.get(name).copied()
    }

    /// Create an overlay element under the tile container and record it
    /// under `name`.
    pub fn add_overlay(&mut self, name: &str) -> NodeKey {
        let key = self.alloc.allocate();
        self.env.create_element(key, ElementKind::Overlay);
        self.env.attach_element(Some(self.container), key);
        self.nodes.insert(name.to_string(), key);
        key
    }

    /// Remove an overlay previously added under `name`.
    pub fn remove_overlay(&mut self, name: &str) -> Option<NodeKey> {
        let key = self.nodes.remove(name)?;
        self.env.remove_element(key);
        Some(key)
    }

    pub fn set_frame(&mut self, name: &str, frame: LayoutBox) {
        if let Some(key) = self.node(name) {
            self.env.set_frame(key, frame);
        }
    }
}

/// Capability hook for item-subtype variation (caption/date overlays and the
/// like) without touching base mount/unmount timing or ordering.
pub trait TileDecorator<T> {
    fn decorate_mount(&mut self, ctx: &mut DecorateContext<'_>, item: &ImageItem<T>) {
        let _ = (ctx, item);
    }

    fn decorate_unmount(&mut self, ctx: &mut DecorateContext<'_>, item: &ImageItem<T>) {
        let _ = (ctx, item);
    }
}
