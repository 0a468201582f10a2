//! Per-view pagination state and the cache keys derived from it.

/// Identifies one fetchable unit of data: a (page index, page size) pair.
/// The API is 1-based, so the request targets `page = page_index + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub page_index: u32,
    pub page_size: u32,
}

impl QueryKey {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// The 1-based page number sent on the wire.
    pub fn request_page(&self) -> u32 {
        self.page_index + 1
    }

    /// Key for the page after this one, used for background prefetch.
    pub fn next(&self) -> Self {
        Self {
            page_index: self.page_index + 1,
            page_size: self.page_size,
        }
    }
}

/// What a page-size change does to the page index. The observed upstream
/// behavior preserves the index, which can land past the last page; both
/// behaviors are supported and the choice comes from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSizePolicy {
    #[default]
    PreservePosition,
    ResetToFirst,
}

/// Mutable pagination state owned by the active view. Mutated only by
/// user-initiated navigation.
#[derive(Debug, Clone, Copy)]
pub struct PaginationState {
    page_index: u32,
    page_size: u32,
    policy: PageSizePolicy,
}

impl PaginationState {
    pub fn new(page_size: u32, policy: PageSizePolicy) -> Self {
        debug_assert!(page_size > 0);
        Self {
            page_index: 0,
            page_size,
            policy,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new(self.page_index, self.page_size)
    }

    /// Move to the next page. No-op when `allowed` is false, i.e. when the
    /// last known metadata shows no further page or the current key's fetch
    /// has not resolved yet.
    pub fn advance(&mut self, allowed: bool) -> bool {
        if !allowed {
            return false;
        }
        self.page_index += 1;
        true
    }

    /// Move to the previous page, flooring at 0.
    pub fn retreat(&mut self) -> bool {
        if self.page_index == 0 {
            return false;
        }
        self.page_index -= 1;
        true
    }

    /// Change the page size. Zero is rejected. The page index is reset or
    /// preserved according to the configured policy.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        if page_size == 0 {
            return false;
        }
        self.page_size = page_size;
        if self.policy == PageSizePolicy::ResetToFirst {
            self.page_index = 0;
        }
        true
    }
}
