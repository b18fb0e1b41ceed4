/// Direction of the most recent scroll movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
}

/// Scroll/viewport snapshot consumed by the visibility pass.
///
/// Owned and mutated by the grid controller on every coalesced tick;
/// read-only to the buffer tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    /// Page-level scroll offset in px.
    pub scroll_offset: f32,
    /// Direction derived from the last offset change.
    pub direction: ScrollDirection,
    /// Distance from the top of the page to the top of the grid container.
    pub container_top: f32,
    /// Height of the visible viewport in px.
    pub viewport_height: f32,
}

impl ViewportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new scroll offset, deriving direction from the delta.
    ///
    /// A zero delta keeps the previous direction so buffer asymmetry stays
    /// stable across repeated resize ticks at a fixed offset.
    pub fn update_scroll(&mut self, offset: f32) {
        if offset < self.scroll_offset {
            self.direction = ScrollDirection::Up;
        } else if offset > self.scroll_offset {
            self.direction = ScrollDirection::Down;
        }
        self.scroll_offset = offset;
    }

    pub fn update_geometry(&mut self, container_top: f32, viewport_height: f32) {
        self.container_top = container_top;
        self.viewport_height = viewport_height;
    }
}
