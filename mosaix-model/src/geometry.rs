/// Computed frame for one grid item within the current layout pass.
///
/// This is intentionally independent of the item's intrinsic pixel
/// dimensions: a `LayoutBox` is where the tile *goes* for the current
/// container width, and the whole set is invalidated and recomputed on every
/// width-changing resize or data change. Boxes are never partially updated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutBox {
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
}

impl LayoutBox {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Result of one full layout pass: one box per item, in item order, plus the
/// total content height the scroll surface should adopt.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLayout {
    pub boxes: Vec<LayoutBox>,
    pub total_height: f32,
}

impl GridLayout {
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
