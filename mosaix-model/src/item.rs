use crate::error::{ModelError, Result};
use crate::ids::ImageId;

/// A single grid entry: an id, the image's width/height ratio, and an opaque
/// payload the layout never inspects.
///
/// `extra` carries subtype-specific fields (capture date, description, ...)
/// straight through to the environment and to decorator hooks. Item identity
/// for layout purposes is the index in the ordered list handed to the
/// controller; the list is replaced wholesale on refresh, never diffed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageItem<T = ()> {
    pub id: ImageId,
    pub aspect_ratio: f32,
    pub extra: T,
}

impl ImageItem<()> {
    pub fn new(id: ImageId, aspect_ratio: f32) -> Result<Self> {
        Self::with_extra(id, aspect_ratio, ())
    }
}

impl<T> ImageItem<T> {
    pub fn with_extra(id: ImageId, aspect_ratio: f32, extra: T) -> Result<Self> {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(ModelError::InvalidAspectRatio(aspect_ratio));
        }
        Ok(Self {
            id,
            aspect_ratio,
            extra,
        })
    }
}
