use crate::item::ImageItem;

/// How many items a page request asks for.
///
/// The wire contract uses `-1` as a "return everything" sentinel; that
/// sentinel only exists at the collaborator boundary, so it is decoded into
/// an explicit variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageCount {
    All,
    Exactly(usize),
}

impl PageCount {
    /// Decode the raw wire count, mapping `-1` (or any negative) to `All`.
    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            PageCount::All
        } else {
            PageCount::Exactly(raw as usize)
        }
    }
}

/// A range of items requested from the paged datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRequest {
    pub start: usize,
    pub count: PageCount,
}

impl PageRequest {
    pub fn new(start: usize, count: usize) -> Self {
        Self {
            start,
            count: PageCount::Exactly(count),
        }
    }

    /// Request every available item in one page.
    pub fn all() -> Self {
        Self {
            start: 0,
            count: PageCount::All,
        }
    }
}

/// One page of items returned by the datastore.
///
/// Once a full-list page (`PageRequest::all`) has been received, the grid
/// treats the item list as gap-free; pagination bookkeeping stays with the
/// collaborator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    pub items: Vec<ImageItem<T>>,
    pub start_index: usize,
    pub total_count: usize,
    pub total_filtered_count: usize,
}

impl<T> Page<T> {
    pub fn returned_count(&self) -> usize {
        self.items.len()
    }
}
