//! Offset-based pagination primitives shared by queries and repositories.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Ordering applied to the entity identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    /// Most recently created first.
    #[default]
    Desc,
}

/// A zero-based page index plus page size.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
    direction: SortDirection,
}

impl PageRequest {
    /// Build a page request. `size` must be positive and is used as given.
    pub fn new(page: u32, size: u32, direction: SortDirection) -> DomainResult<Self> {
        if size == 0 {
            return Err(DomainError::invalid_field("size", "must be greater than 0"));
        }
        Ok(Self {
            page,
            size,
            direction,
        })
    }

    /// Page request ordered by identifier descending.
    pub fn newest_first(page: u32, size: u32) -> DomainResult<Self> {
        Self::new(page, size, SortDirection::Desc)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Number of rows to skip before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus the totals of the whole (filtered) result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    content: Vec<T>,
    total_elements: u64,
    total_pages: u32,
    number: u32,
    size: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: PageRequest) -> Self {
        let size = u64::from(request.size());
        let total_pages = total_elements.div_ceil(size);
        Self {
            content,
            total_elements,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            number: request.page(),
            size: request.size(),
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Zero-based index of this page.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Project the content, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }
}
