//! Paged data-source seam.
//!
//! The grid never fetches anything itself; a collaborator hands it pages of
//! items. The only call the engine makes is "give me everything"; pagination
//! bookkeeping, sorting and filtering stay on the collaborator's side.

use async_trait::async_trait;
use mosaix_model::{Page, PageRequest};

use crate::error::SourceError;

/// Interface for paged image-item access.
///
/// Implementations can sit on anything (in-memory fixture, HTTP API, ...).
#[async_trait]
pub trait PagedImageSource<T: Send>: Send + Sync {
    /// Fetch a range of items. [`PageRequest::all`] asks for the complete,
    /// gap-free list.
    async fn get_page(&self, request: PageRequest) -> Result<Page<T>, SourceError>;
}

/// Drain the source's complete item list in one request.
pub async fn fetch_all_items<T: Send>(
    source: &dyn PagedImageSource<T>,
) -> Result<Page<T>, SourceError> {
    let page = source.get_page(PageRequest::all()).await?;
    log::debug!(
        "fetched {} of {} items from source",
        page.returned_count(),
        page.total_count
    );
    Ok(page)
}
