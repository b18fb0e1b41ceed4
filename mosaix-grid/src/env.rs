//! Environment seam between the grid engine and whatever renders it.
//!
//! The engine never touches a real widget tree. It issues node commands
//! against [`Surface`] using engine-assigned [`NodeKey`]s, asks [`Scheduler`]
//! for timers/frames, and the embedder pumps [`SurfaceEvent`]s back into the
//! controller. This keeps the core headless-testable and portable across
//! rendering targets.

use std::time::{Duration, Instant};

use mosaix_model::LayoutBox;

/// Interval of the fixed-timer fallback used where the environment has no
/// native frame-scheduling primitive (~15fps).
pub const FRAME_FALLBACK_INTERVAL: Duration = Duration::from_millis(66);

/// Engine-assigned handle for one rendered element.
///
/// The surface maps keys to its own node representation; the engine never
/// sees the other side of that mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u64);

/// Allocator for [`NodeKey`]s, owned by the grid controller.
#[derive(Debug, Default)]
pub struct NodeKeyAllocator {
    next: u64,
}

impl NodeKeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> NodeKey {
        let key = NodeKey(self.next);
        self.next += 1;
        key
    }
}

/// Handle for a scheduled timeout or frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(pub u64);

/// What kind of element a [`NodeKey`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Positioned wrapper for one grid item.
    TileContainer,
    /// Low-resolution blur-up placeholder image.
    PlaceholderImage,
    /// Full-resolution image.
    FullImage,
    /// Decorator-owned overlay (caption, date badge, ...).
    Overlay,
}

/// Urgency hint forwarded with asset sources.
///
/// `Visible` means the tile intersects the bare viewport; `Preload` means
/// only the scroll buffer reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetPriority {
    Visible,
    Preload,
}

impl AssetPriority {
    /// Convert the priority to a queue weight (higher is more urgent).
    pub fn weight(&self) -> u8 {
        match self {
            AssetPriority::Visible => 2,
            AssetPriority::Preload => 1,
        }
    }
}

/// Current geometry of the scroll container, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Page-level scroll offset in px.
    pub scroll_offset: f32,
    /// Height of the visible viewport in px.
    pub viewport_height: f32,
    /// Distance from the top of the page to the top of the container.
    pub container_top: f32,
    /// Inner width of the container in px.
    pub container_width: f32,
}

/// Node-level commands the engine issues against the rendering target.
///
/// All operations are keyed by [`NodeKey`]; unknown keys must be ignored, not
/// panicked on, since teardown and in-flight events can race benignly.
pub trait Surface {
    fn create_element(&mut self, key: NodeKey, kind: ElementKind);

    /// Attach `key` under `parent`, or under the grid root for `None`.
    fn attach_element(&mut self, parent: Option<NodeKey>, key: NodeKey);

    fn remove_element(&mut self, key: NodeKey);

    fn set_frame(&mut self, key: NodeKey, frame: LayoutBox);

    /// Enable the fade transition used for the blur-up reveal.
    fn set_fade_transition(&mut self, key: NodeKey, enabled: bool);

    /// Point an image element at an asset. `pixel_size` is the requested
    /// asset resolution, not the on-screen frame.
    fn set_source(&mut self, key: NodeKey, url: &str, pixel_size: (u32, u32), priority: AssetPriority);

    /// Drop the asset source, signalling disinterest in any in-flight load.
    fn clear_source(&mut self, key: NodeKey);

    /// Apply the "loaded" visual marker once the asset finished loading.
    fn mark_loaded(&mut self, key: NodeKey);

    fn watch_clicks(&mut self, key: NodeKey, enabled: bool);

    /// Adopt the total content height computed by the layout pass.
    fn set_surface_height(&mut self, height: f32);

    /// `None` when the container element is missing; the grid then degrades
    /// to a dormant no-op instead of crashing the embedder.
    fn metrics(&self) -> Option<SurfaceMetrics>;
}

/// Timer/frame scheduling provided by the environment.
pub trait Scheduler {
    fn schedule_timeout(&mut self, delay: Duration) -> CallbackHandle;

    fn cancel_timeout(&mut self, handle: CallbackHandle);

    /// Schedule a callback for the next rendering frame.
    ///
    /// Environments without a frame primitive inherit the fixed-interval
    /// fallback.
    fn schedule_frame(&mut self) -> CallbackHandle {
        self.schedule_timeout(FRAME_FALLBACK_INTERVAL)
    }

    fn now(&self) -> Instant;
}

/// Combined environment handle taken by controller entry points.
pub trait GridEnv: Surface + Scheduler {}

impl<E: Surface + Scheduler> GridEnv for E {}

/// Raw signals the embedder pumps into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The page scrolled; the new offset is read from [`Surface::metrics`].
    Scrolled,
    /// The container resized; new geometry is read from [`Surface::metrics`].
    Resized,
    /// A scheduled timeout or frame callback fired.
    TimerFired(CallbackHandle),
    /// An image element finished loading its asset.
    AssetLoaded(NodeKey),
    /// An image element failed to load its asset.
    AssetFailed(NodeKey),
    /// A click-watched element was activated.
    Clicked(NodeKey),
}
