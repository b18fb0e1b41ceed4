//! Grid configuration: numeric tuning plus injected policies.
//!
//! Tuning values are plain serde-friendly numbers so embedders can persist
//! them; policies are closures (URL builders, breakpoint functions) and an
//! optional tile decorator.

use mosaix_model::{ImageItem, ImageSizeClass, min_row_aspect};
use serde::{Deserialize, Serialize};

use crate::tile::TileDecorator;

/// URL builder: item plus requested pixel width/height.
pub type UrlFn<T> = Box<dyn Fn(&ImageItem<T>, u32, u32) -> String>;

/// Breakpoint policy returning the minimum row aspect for a container width.
pub type MinRowAspectFn = Box<dyn Fn(f32) -> f32>;

/// Breakpoint policy returning the asset size class for a container width.
pub type ImageSizeFn = Box<dyn Fn(f32) -> ImageSizeClass>;

/// Numeric tuning knobs, all defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTuning {
    /// Buffer in the direction of travel, px.
    pub primary_buffer_px: f32,
    /// Buffer behind the direction of travel, px.
    pub secondary_buffer_px: f32,
    /// Gap between tiles, px.
    pub gap_px: f32,
    /// Requested pixel width of blur-up placeholder assets.
    pub thumbnail_size_px: f32,
    /// Whether tiles watch for clicks and report item ids.
    pub with_click_events: bool,
    /// Scroll speed in px/s beyond which placeholder upgrades are postponed.
    pub fast_scroll_threshold: f32,
    /// Length of the scroll velocity sample window.
    pub velocity_samples: usize,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            primary_buffer_px: 1000.0,
            secondary_buffer_px: 300.0,
            gap_px: 8.0,
            thumbnail_size_px: 20.0,
            with_click_events: false,
            fast_scroll_threshold: 5000.0,
            velocity_samples: 5,
        }
    }
}

/// Injected behavior: URL builders, breakpoint policies, optional decorator.
pub struct GridPolicies<T> {
    pub url_for_image: UrlFn<T>,
    /// Placeholder URL builder; falls back to `url_for_image` when absent.
    pub url_for_thumbnail: Option<UrlFn<T>>,
    pub min_row_aspect: MinRowAspectFn,
    pub image_size: ImageSizeFn,
    pub decorator: Option<Box<dyn TileDecorator<T>>>,
}

impl<T> std::fmt::Debug for GridPolicies<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridPolicies")
            .field("url_for_thumbnail", &self.url_for_thumbnail.is_some())
            .field("decorator", &self.decorator.is_some())
            .finish_non_exhaustive()
    }
}

/// Complete grid configuration.
#[derive(Debug)]
pub struct GridOptions<T> {
    pub tuning: GridTuning,
    pub policies: GridPolicies<T>,
}

impl<T> GridOptions<T> {
    /// Build options around the one policy that has no sane default: the
    /// full-resolution URL builder.
    pub fn new(url_for_image: impl Fn(&ImageItem<T>, u32, u32) -> String + 'static) -> Self {
        Self {
            tuning: GridTuning::default(),
            policies: GridPolicies {
                url_for_image: Box::new(url_for_image),
                url_for_thumbnail: None,
                min_row_aspect: Box::new(min_row_aspect),
                image_size: Box::new(ImageSizeClass::for_container_width),
                decorator: None,
            },
        }
    }

    pub fn tuning(mut self, tuning: GridTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_click_events(mut self, enabled: bool) -> Self {
        self.tuning.with_click_events = enabled;
        self
    }

    pub fn url_for_thumbnail(
        mut self,
        builder: impl Fn(&ImageItem<T>, u32, u32) -> String + 'static,
    ) -> Self {
        self.policies.url_for_thumbnail = Some(Box::new(builder));
        self
    }

    pub fn min_row_aspect(mut self, policy: impl Fn(f32) -> f32 + 'static) -> Self {
        self.policies.min_row_aspect = Box::new(policy);
        self
    }

    pub fn image_size(mut self, policy: impl Fn(f32) -> ImageSizeClass + 'static) -> Self {
        self.policies.image_size = Box::new(policy);
        self
    }

    pub fn decorator(mut self, decorator: impl TileDecorator<T> + 'static) -> Self {
        self.policies.decorator = Some(Box::new(decorator));
        self
    }
}
