//! Mock photo library: a seeded, in-memory paged image source.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mosaix_grid::{PagedImageSource, SourceError};
use mosaix_model::{ImageId, ImageItem, Page, PageCount, PageRequest};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

/// Extra payload carried by demo items, untouched by layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoDetails {
    pub taken_at: DateTime<Utc>,
    pub description: String,
}

/// Seeded in-memory photo library.
///
/// Aspect ratios span portrait 2:3 through wide 2:1 so the justified rows
/// get realistic variety for a given seed.
pub struct MockLibrary {
    photos: Vec<ImageItem<PhotoDetails>>,
    requests_served: Mutex<usize>,
    fail: bool,
}

impl MockLibrary {
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let photos = (0..count)
            .map(|index| {
                let aspect_ratio = rng.random_range(0.66..2.0_f32);
                let details = PhotoDetails {
                    taken_at: epoch + chrono::Duration::hours(rng.random_range(0..17_000_i64)),
                    description: format!("photo {index}"),
                };
                ImageItem::with_extra(
                    ImageId::new(format!("photo-{index}")).expect("generated id is non-empty"),
                    aspect_ratio,
                    details,
                )
                .expect("generated aspect ratio is positive")
            })
            .collect();
        Self {
            photos,
            requests_served: Mutex::new(0),
            fail: false,
        }
    }

    /// A library whose backend is down, for exercising the error path.
    pub fn failing() -> Self {
        Self {
            photos: Vec::new(),
            requests_served: Mutex::new(0),
            fail: true,
        }
    }

    pub fn requests_served(&self) -> usize {
        *self.requests_served.lock()
    }
}

#[async_trait]
impl PagedImageSource<PhotoDetails> for MockLibrary {
    async fn get_page(
        &self,
        request: PageRequest,
    ) -> Result<Page<PhotoDetails>, SourceError> {
        *self.requests_served.lock() += 1;
        if self.fail {
            return Err(SourceError::new("mock backend unavailable"));
        }
        let items: Vec<_> = match request.count {
            PageCount::All => self.photos.clone(),
            PageCount::Exactly(count) => self
                .photos
                .iter()
                .skip(request.start)
                .take(count)
                .cloned()
                .collect(),
        };
        Ok(Page {
            items,
            start_index: request.start,
            total_count: self.photos.len(),
            total_filtered_count: self.photos.len(),
        })
    }
}
