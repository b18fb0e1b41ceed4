//! Viewport buffer tracking.
//!
//! Decides, per tile, whether it should be live. Buffer heights flip with
//! scroll direction: travelling up applies the tall primary (preload) height
//! to the window edges, travelling down the short secondary height. Every
//! tile is re-evaluated on every tick: O(N), bounded in practice by the
//! item count a screenful implies; a documented scalability limit rather
//! than a bug.

use mosaix_model::{LayoutBox, ScrollDirection, ViewportState};

use crate::env::AssetPriority;

/// Mount/unmount decision for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileIntent {
    Show(AssetPriority),
    Hide,
}

impl TileIntent {
    pub fn is_show(&self) -> bool {
        matches!(self, TileIntent::Show(_))
    }
}

/// Buffer extents in px around the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferHeights {
    /// Tall preload buffer.
    pub primary: f32,
    /// Short trailing buffer.
    pub secondary: f32,
}

/// Evaluate visibility for every tile against the current viewport.
pub fn select_visible(
    boxes: &[LayoutBox],
    viewport: &ViewportState,
    buffers: BufferHeights,
) -> Vec<TileIntent> {
    let buffer_top = if viewport.direction == ScrollDirection::Up {
        buffers.primary
    } else {
        buffers.secondary
    };
    let buffer_bottom = if viewport.direction == ScrollDirection::Down {
        buffers.secondary
    } else {
        buffers.primary
    };

    let viewport_top = viewport.scroll_offset - viewport.container_top;
    let viewport_bottom = viewport_top + viewport.viewport_height;
    let top_edge = viewport_top - buffer_top;
    let bottom_edge = viewport_bottom + buffer_bottom;

    boxes
        .iter()
        .map(|tile| {
            if tile.bottom() >= top_edge && tile.y <= bottom_edge {
                // On-screen tiles load ahead of buffered ones.
                if tile.bottom() >= viewport_top && tile.y <= viewport_bottom {
                    TileIntent::Show(AssetPriority::Visible)
                } else {
                    TileIntent::Show(AssetPriority::Preload)
                }
            } else {
                TileIntent::Hide
            }
        })
        .collect()
}
