use std::fmt::{Display, Formatter};

/// Asset resolution classes keyed on container width breakpoints.
///
/// These are *requested* sizes handed to URL builders; the actual pixel data
/// a datastore serves for a class is its own concern.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageSizeClass {
    W100,
    #[default]
    W250,
    W500,
}

impl ImageSizeClass {
    pub const ALL: [ImageSizeClass; 3] = [Self::W100, Self::W250, Self::W500];

    /// Default step function: narrow containers get small assets, anything
    /// wider than 1920px gets the large class.
    pub fn for_container_width(width: f32) -> Self {
        if width <= 640.0 {
            Self::W100
        } else if width <= 1920.0 {
            Self::W250
        } else {
            Self::W500
        }
    }

    /// Target row height in px for this class.
    pub const fn row_height(&self) -> u32 {
        match self {
            Self::W100 => 100,
            Self::W250 => 250,
            Self::W500 => 500,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::W100 => "w100",
            Self::W250 => "w250",
            Self::W500 => "w500",
        }
    }
}

impl Display for ImageSizeClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::W100 => write!(f, "100px"),
            Self::W250 => write!(f, "250px"),
            Self::W500 => write!(f, "500px"),
        }
    }
}

/// Default minimum accumulated aspect ratio for a row to be considered full.
///
/// Wider containers demand wider rows so individual tiles keep a sane size.
pub fn min_row_aspect(container_width: f32) -> f32 {
    if container_width <= 640.0 {
        2.0
    } else if container_width <= 1280.0 {
        4.0
    } else if container_width <= 1920.0 {
        5.0
    } else {
        6.0
    }
}
