//! Justified row packing.
//!
//! Items are laid into horizontal strips that exactly fill the container
//! width: each row accumulates aspect ratios until the configured minimum is
//! reached, then the whole strip is scaled to a shared height. Pure geometry,
//! no environment access.

use mosaix_model::{GridLayout, ImageItem, LayoutBox};

/// Inputs for one layout pass.
pub struct LayoutParams<'a> {
    pub container_width: f32,
    /// Gap in px between tiles, horizontally and vertically.
    pub gap: f32,
    /// Minimum accumulated aspect ratio for a row to be considered full,
    /// keyed on container width.
    pub min_row_aspect: &'a dyn Fn(f32) -> f32,
}

impl std::fmt::Debug for LayoutParams<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutParams")
            .field("container_width", &self.container_width)
            .field("gap", &self.gap)
            .finish_non_exhaustive()
    }
}

/// Compute one full layout: a box per item, in item order, plus total height.
///
/// A row flushes when its accumulated aspect ratio reaches the minimum, or at
/// the final item. The final, possibly under-filled row is clamped up to the
/// minimum aspect so it still gets a sane height instead of ballooning.
/// Total height is clamped to zero for the empty layout.
pub fn compute_layout<T>(items: &[ImageItem<T>], params: &LayoutParams<'_>) -> GridLayout {
    let min_aspect = (params.min_row_aspect)(params.container_width).max(f32::EPSILON);
    let mut boxes = Vec::with_capacity(items.len());
    let mut y = 0.0;
    let mut row_start = 0;
    let mut row_aspect = 0.0;

    for (index, item) in items.iter().enumerate() {
        row_aspect += item.aspect_ratio;
        let is_last = index + 1 == items.len();
        if row_aspect < min_aspect && !is_last {
            continue;
        }

        // Flush the row [row_start..=index] at a shared height.
        let clamped_aspect = row_aspect.max(min_aspect);
        let tile_count = index - row_start + 1;
        let row_height = (params.container_width - params.gap * (tile_count as f32 - 1.0))
            / clamped_aspect;
        let mut x = 0.0;
        for row_item in &items[row_start..=index] {
            let width = row_height * row_item.aspect_ratio;
            boxes.push(LayoutBox {
                width,
                height: row_height,
                x,
                y,
            });
            x += width + params.gap;
        }
        y += row_height + params.gap;
        row_start = index + 1;
        row_aspect = 0.0;
    }

    GridLayout {
        boxes,
        total_height: (y - params.gap).max(0.0),
    }
}
