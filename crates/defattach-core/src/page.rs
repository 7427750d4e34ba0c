use serde::{Deserialize, Serialize};

use crate::search::SearchTerm;
use crate::sort::SortKey;

pub const DEFAULT_PAGE_SIZE: i32 = 10;

/// Paged search request as callers send it.
///
/// Out-of-range values are clamped rather than rejected: a negative
/// `page_index` becomes 0, a non-positive `page_size` becomes
/// [`DEFAULT_PAGE_SIZE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page_index: i32,
    #[serde(default)]
    pub page_size: i32,
    /// Reserved for per-field search; currently ignored.
    #[serde(default)]
    pub search_field: String,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub sort_order: String,
}

impl PageRequest {
    pub fn new(page_index: i32, page_size: i32) -> Self {
        Self {
            page_index,
            page_size,
            ..Default::default()
        }
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn with_sort(mut self, sort_order: impl Into<String>) -> Self {
        self.sort_order = sort_order.into();
        self
    }

    pub fn page_index(&self) -> i32 {
        self.page_index.max(0)
    }

    pub fn page_size(&self) -> i32 {
        if self.page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    /// Row offset of the page. Computed in 64 bits so large indexes can't
    /// overflow.
    pub fn offset(&self) -> i64 {
        i64::from(self.page_index()) * i64::from(self.page_size())
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size())
    }

    pub fn search_term(&self) -> Option<SearchTerm> {
        SearchTerm::parse(&self.search_query)
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::resolve(&self.sort_order)
    }
}

/// One page of results plus the number of rows matching the filter overall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSet<T> {
    pub items: Vec<T>,
    pub total_count: i64,
}

impl<T> ArticleSet<T> {
    pub fn new(items: Vec<T>, total_count: i64) -> Self {
        Self { items, total_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_negative_index_and_non_positive_size() {
        let req = PageRequest::new(-3, 0);
        assert_eq!(req.page_index(), 0);
        assert_eq!(req.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(2, -5);
        assert_eq!(req.page_size(), 10);
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn offset_is_index_times_size() {
        let req = PageRequest::new(4, 25);
        assert_eq!(req.offset(), 100);
        assert_eq!(req.limit(), 25);
    }

    #[test]
    fn offset_does_not_overflow() {
        let req = PageRequest::new(i32::MAX, i32::MAX);
        assert_eq!(req.offset(), i64::from(i32::MAX) * i64::from(i32::MAX));
    }

    #[test]
    fn search_and_sort_are_resolved_from_strings() {
        let req = PageRequest::new(0, 10).with_search("  ").with_sort("bogus");
        assert!(req.search_term().is_none());
        assert_eq!(req.sort_key(), SortKey::IdDesc);

        let req = PageRequest::new(0, 10).with_search("2").with_sort("NameDesc");
        assert_eq!(req.search_term().unwrap().as_int(), Some(2));
        assert_eq!(req.sort_key(), SortKey::NameDesc);
    }
}
