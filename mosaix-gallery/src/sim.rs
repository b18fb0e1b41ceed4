//! Simulated rendering environment with a virtual clock.
//!
//! Stands in for a real widget tree: nodes live in a map, timers in a due
//! list, and asset loads "arrive" a fixed virtual latency after their source
//! is set. The session loop advances the clock, drains whatever came due,
//! and feeds the resulting events to the grid.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use mosaix_grid::{
    AssetPriority, CallbackHandle, ElementKind, NodeKey, Scheduler, Surface, SurfaceEvent,
    SurfaceMetrics,
};
use mosaix_model::LayoutBox;

/// Simulated one-way latency for asset loads.
const ASSET_LATENCY: Duration = Duration::from_millis(180);

#[derive(Debug, Default, Clone)]
pub struct SimStats {
    pub nodes_created: usize,
    pub nodes_removed: usize,
    pub sources_set: usize,
    pub sources_cleared: usize,
    pub loads_delivered: usize,
    pub marks_applied: usize,
}

pub struct SimEnv {
    metrics: SurfaceMetrics,
    base: Instant,
    clock: Duration,
    next_handle: u64,
    timers: Vec<(CallbackHandle, Duration)>,
    pending_assets: Vec<(NodeKey, Duration)>,
    live: HashMap<NodeKey, ElementKind>,
    pub stats: SimStats,
}

impl SimEnv {
    pub fn new(container_width: f32, viewport_height: f32) -> Self {
        Self {
            metrics: SurfaceMetrics {
                scroll_offset: 0.0,
                viewport_height,
                container_top: 0.0,
                container_width,
            },
            base: Instant::now(),
            clock: Duration::ZERO,
            next_handle: 0,
            timers: Vec::new(),
            pending_assets: Vec::new(),
            live: HashMap::new(),
            stats: SimStats::default(),
        }
    }

    pub fn scroll_to(&mut self, offset: f32) {
        self.metrics.scroll_offset = offset.max(0.0);
    }

    pub fn advance(&mut self, delta: Duration) {
        self.clock += delta;
    }

    /// Everything (timers, asset completions) that came due by now.
    pub fn drain_due(&mut self) -> Vec<SurfaceEvent> {
        let now = self.clock;
        let mut events = Vec::new();

        let mut due_timers = Vec::new();
        self.timers.retain(|(handle, due)| {
            if *due <= now {
                due_timers.push(*handle);
                false
            } else {
                true
            }
        });
        events.extend(due_timers.into_iter().map(SurfaceEvent::TimerFired));

        let mut due_assets = Vec::new();
        self.pending_assets.retain(|(key, due)| {
            if *due <= now {
                due_assets.push(*key);
                false
            } else {
                true
            }
        });
        for key in due_assets {
            // Loads for removed nodes never report back.
            if self.live.contains_key(&key) {
                self.stats.loads_delivered += 1;
                events.push(SurfaceEvent::AssetLoaded(key));
            }
        }

        events
    }

    pub fn has_pending_work(&self) -> bool {
        !self.timers.is_empty() || !self.pending_assets.is_empty()
    }

    pub fn live_count(&self, kind: ElementKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    pub fn first_live(&self, kind: ElementKind) -> Option<NodeKey> {
        self.live
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(key, _)| *key)
            .min()
    }
}

impl Surface for SimEnv {
    fn create_element(&mut self, key: NodeKey, kind: ElementKind) {
        self.live.insert(key, kind);
        self.stats.nodes_created += 1;
    }

    fn attach_element(&mut self, _parent: Option<NodeKey>, _key: NodeKey) {}

    fn remove_element(&mut self, key: NodeKey) {
        if self.live.remove(&key).is_some() {
            self.stats.nodes_removed += 1;
        }
    }

    fn set_frame(&mut self, _key: NodeKey, _frame: LayoutBox) {}

    fn set_fade_transition(&mut self, _key: NodeKey, _enabled: bool) {}

    fn set_source(&mut self, key: NodeKey, url: &str, pixel_size: (u32, u32), priority: AssetPriority) {
        log::trace!(
            "source {url} at {}x{} ({priority:?})",
            pixel_size.0,
            pixel_size.1
        );
        self.stats.sources_set += 1;
        self.pending_assets.push((key, self.clock + ASSET_LATENCY));
    }

    fn clear_source(&mut self, key: NodeKey) {
        self.stats.sources_cleared += 1;
        self.pending_assets.retain(|(k, _)| *k != key);
    }

    fn mark_loaded(&mut self, _key: NodeKey) {
        self.stats.marks_applied += 1;
    }

    fn watch_clicks(&mut self, _key: NodeKey, _enabled: bool) {}

    fn set_surface_height(&mut self, height: f32) {
        log::debug!("surface height set to {height:.1}px");
    }

    fn metrics(&self) -> Option<SurfaceMetrics> {
        Some(self.metrics)
    }
}

impl Scheduler for SimEnv {
    fn schedule_timeout(&mut self, delay: Duration) -> CallbackHandle {
        let handle = CallbackHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push((handle, self.clock + delay));
        handle
    }

    fn cancel_timeout(&mut self, handle: CallbackHandle) {
        self.timers.retain(|(h, _)| *h != handle);
    }

    fn now(&self) -> Instant {
        self.base + self.clock
    }
}
