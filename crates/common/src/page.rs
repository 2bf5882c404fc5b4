//! Offset-addressed pagination.

use std::num::NonZeroU32;

use serde::Serialize;
use thiserror::Error;

/// Rejected page request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid page request: page size must be greater than 0")]
pub struct InvalidPageRequest;

/// A request for one window of a larger result set.
///
/// Page numbers start at 0. The page size is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Creates a page request, rejecting a zero page size.
    pub fn new(page: u32, page_size: u32) -> Result<Self, InvalidPageRequest> {
        if page_size == 0 {
            return Err(InvalidPageRequest);
        }
        Ok(Self { page, page_size })
    }

    /// Creates a page request from a size that is already known to be non-zero.
    pub fn with_size(page: u32, page_size: NonZeroU32) -> Self {
        Self {
            page,
            page_size: page_size.get(),
        }
    }

    /// Returns the zero-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the maximum number of items on a page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items that precede this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Maximum number of items on this page.
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One window over a result set, with total-count metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Builds a page for `request` holding `items` out of `total_elements`.
    ///
    /// `total_pages` is derived as `ceil(total_elements / page_size)`.
    pub fn new(items: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            items,
            page_number: request.page(),
            page_size: request.page_size(),
            total_elements,
            total_pages: total_elements.div_ceil(request.limit()),
        }
    }

    /// An empty page, used when nothing matches.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Converts the items while keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    /// Returns true if this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
