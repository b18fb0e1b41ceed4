//! Mosaix grid engine
//!
//! Progressive, virtualized image grid: justified row layout, direction-aware
//! viewport buffering, a two-stage tile lifecycle with blur-up loading, and
//! frame-coalesced relayout.
//!
//! The engine is renderer-agnostic. Embedders implement [`Surface`] and
//! [`Scheduler`] (together [`GridEnv`]), pump [`SurfaceEvent`]s into
//! [`ImageGrid::handle_event`], and receive [`GridEvent`]s back. Items come
//! from a [`PagedImageSource`] or directly via [`ImageGrid::set_image_data`].
//!
//! Notes
//! - Single-threaded by design: all layout/visibility mutation happens on the
//!   embedder's event loop, ordered by the coalescer.
//! - Visibility is O(items) per coalesced tick; fine for screenfuls, a known
//!   limit for very large collections.

pub mod coalesce;
pub mod config;
pub mod controller;
pub mod env;
pub mod error;
pub mod layout;
pub mod source;
pub mod tile;
pub mod velocity;
pub mod visibility;

pub use coalesce::RelayoutCoalescer;
pub use config::{GridOptions, GridPolicies, GridTuning};
pub use controller::{GridEvent, ImageGrid};
pub use env::{
    AssetPriority, CallbackHandle, ElementKind, FRAME_FALLBACK_INTERVAL, GridEnv, NodeKey,
    NodeKeyAllocator, Scheduler, Surface, SurfaceEvent, SurfaceMetrics,
};
pub use error::{GridError, SourceError};
pub use layout::{LayoutParams, compute_layout};
pub use source::{PagedImageSource, fetch_all_items};
pub use tile::{
    AssetKind, DecorateContext, MOUNT_DEFER_DELAY, SUB_CONTAINER, SUB_FULL_IMAGE, SUB_PLACEHOLDER,
    Tile, TileDecorator, TilePhase,
};
pub use velocity::ScrollVelocityTracker;
pub use visibility::{BufferHeights, TileIntent, select_visible};

// Re-export the model crate for one-import consumers.
pub use mosaix_model as model;
