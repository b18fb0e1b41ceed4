//! Shared test environment: a recording surface plus a deterministic
//! hand-driven scheduler with a virtual clock.
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use mosaix_grid::{
    AssetPriority, CallbackHandle, ElementKind, GridOptions, NodeKey, Scheduler, Surface,
    SurfaceMetrics,
};
use mosaix_model::{ImageId, ImageItem, LayoutBox};

/// Every surface command the engine issued, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create(NodeKey, ElementKind),
    Attach(Option<NodeKey>, NodeKey),
    Remove(NodeKey),
    SetFrame(NodeKey, LayoutBox),
    SetFadeTransition(NodeKey, bool),
    SetSource(NodeKey, String, (u32, u32), AssetPriority),
    ClearSource(NodeKey),
    MarkLoaded(NodeKey),
    WatchClicks(NodeKey, bool),
    SetSurfaceHeight(f32),
}

pub struct TestEnv {
    pub commands: Vec<Command>,
    pub metrics: Option<SurfaceMetrics>,
    pub scheduled: Vec<(CallbackHandle, Duration)>,
    pub cancelled: Vec<CallbackHandle>,
    kinds: HashMap<NodeKey, ElementKind>,
    live: HashMap<NodeKey, ElementKind>,
    base: Instant,
    clock: Duration,
    next_handle: u64,
}

impl TestEnv {
    pub fn new(metrics: SurfaceMetrics) -> Self {
        Self {
            commands: Vec::new(),
            metrics: Some(metrics),
            scheduled: Vec::new(),
            cancelled: Vec::new(),
            kinds: HashMap::new(),
            live: HashMap::new(),
            base: Instant::now(),
            clock: Duration::ZERO,
            next_handle: 0,
        }
    }

    /// Environment whose container element is missing.
    pub fn without_container() -> Self {
        let mut env = Self::new(default_metrics());
        env.metrics = None;
        env
    }

    pub fn advance(&mut self, delta: Duration) {
        self.clock += delta;
    }

    pub fn set_scroll_offset(&mut self, offset: f32) {
        if let Some(metrics) = self.metrics.as_mut() {
            metrics.scroll_offset = offset;
        }
    }

    pub fn set_container_width(&mut self, width: f32) {
        if let Some(metrics) = self.metrics.as_mut() {
            metrics.container_width = width;
        }
    }

    /// Number of live (created and not yet removed) elements of `kind`.
    pub fn live_count(&self, kind: ElementKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    pub fn is_live(&self, key: NodeKey) -> bool {
        self.live.contains_key(&key)
    }

    /// Drain the handles of every currently scheduled timer.
    pub fn take_scheduled(&mut self) -> Vec<CallbackHandle> {
        self.scheduled.drain(..).map(|(handle, _)| handle).collect()
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    /// Last surface height the engine set, if any.
    pub fn surface_height(&self) -> Option<f32> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::SetSurfaceHeight(height) => Some(*height),
            _ => None,
        })
    }

    /// Every source URL set for `key`, in order.
    pub fn sources_for(&self, key: NodeKey) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::SetSource(k, url, _, _) if *k == key => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Keys of live elements of `kind`, in creation order.
    pub fn live_keys(&self, kind: ElementKind) -> Vec<NodeKey> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Create(key, k) if *k == kind && self.live.contains_key(key) => Some(*key),
                _ => None,
            })
            .collect()
    }
}

impl Surface for TestEnv {
    fn create_element(&mut self, key: NodeKey, kind: ElementKind) {
        self.kinds.insert(key, kind);
        self.live.insert(key, kind);
        self.commands.push(Command::Create(key, kind));
    }

    fn attach_element(&mut self, parent: Option<NodeKey>, key: NodeKey) {
        self.commands.push(Command::Attach(parent, key));
    }

    fn remove_element(&mut self, key: NodeKey) {
        self.live.remove(&key);
        self.commands.push(Command::Remove(key));
    }

    fn set_frame(&mut self, key: NodeKey, frame: LayoutBox) {
        self.commands.push(Command::SetFrame(key, frame));
    }

    fn set_fade_transition(&mut self, key: NodeKey, enabled: bool) {
        self.commands.push(Command::SetFadeTransition(key, enabled));
    }

    fn set_source(&mut self, key: NodeKey, url: &str, pixel_size: (u32, u32), priority: AssetPriority) {
        self.commands
            .push(Command::SetSource(key, url.to_string(), pixel_size, priority));
    }

    fn clear_source(&mut self, key: NodeKey) {
        self.commands.push(Command::ClearSource(key));
    }

    fn mark_loaded(&mut self, key: NodeKey) {
        self.commands.push(Command::MarkLoaded(key));
    }

    fn watch_clicks(&mut self, key: NodeKey, enabled: bool) {
        self.commands.push(Command::WatchClicks(key, enabled));
    }

    fn set_surface_height(&mut self, height: f32) {
        self.commands.push(Command::SetSurfaceHeight(height));
    }

    fn metrics(&self) -> Option<SurfaceMetrics> {
        self.metrics
    }
}

impl Scheduler for TestEnv {
    fn schedule_timeout(&mut self, delay: Duration) -> CallbackHandle {
        let handle = CallbackHandle(self.next_handle);
        self.next_handle += 1;
        self.scheduled.push((handle, delay));
        handle
    }

    fn cancel_timeout(&mut self, handle: CallbackHandle) {
        self.cancelled.push(handle);
        self.scheduled.retain(|(h, _)| *h != handle);
    }

    fn now(&self) -> Instant {
        self.base + self.clock
    }
}

pub fn default_metrics() -> SurfaceMetrics {
    SurfaceMetrics {
        scroll_offset: 0.0,
        viewport_height: 600.0,
        container_top: 0.0,
        container_width: 1000.0,
    }
}

pub fn create_test_items(aspects: &[f32]) -> Vec<ImageItem> {
    aspects
        .iter()
        .enumerate()
        .map(|(i, &aspect)| {
            ImageItem::new(ImageId::new(format!("img-{i}")).unwrap(), aspect).unwrap()
        })
        .collect()
}

pub fn test_options() -> GridOptions<()> {
    GridOptions::new(|item, w, h| format!("https://img.test/{}/{w}x{h}", item.id))
}

/// Fire every scheduled timer (and whatever they schedule) until quiet.
pub fn fire_all(
    grid: &mut mosaix_grid::ImageGrid<()>,
    env: &mut TestEnv,
) -> Vec<mosaix_grid::GridEvent> {
    let mut events = Vec::new();
    loop {
        let handles = env.take_scheduled();
        if handles.is_empty() {
            break;
        }
        for handle in handles {
            events.extend(grid.handle_event(env, mosaix_grid::SurfaceEvent::TimerFired(handle)));
        }
    }
    events
}
