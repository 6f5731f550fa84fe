//! Paginated list responses.

use serde::{Deserialize, Serialize};

/// One page of a list response.
///
/// Invariant: `total_pages == ceil(total_count / page_size)` and
/// `data.len() <= page_size`. [`PaginationEnvelope::new`] and
/// [`PaginationEnvelope::normalized`] are the only ways this crate
/// produces or accepts an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationEnvelope<T> {
    pub data: Vec<T>,
    /// 0 when the server omitted it; [`PaginationEnvelope::normalized`]
    /// fills in the requested page.
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// Number of pages needed for `total_count` items at `page_size` per page.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size)) as u32
}

impl<T> PaginationEnvelope<T> {
    /// Builds a page, truncating `data` to `page_size` and deriving `total_pages`.
    pub fn new(mut data: Vec<T>, page_number: u32, page_size: u32, total_count: u64) -> Self {
        let page_size = page_size.max(1);
        data.truncate(page_size as usize);
        Self {
            data,
            page_number: page_number.max(1),
            page_size,
            total_pages: total_pages(total_count, page_size),
            total_count,
        }
    }

    /// Slices a full result set into the requested page.
    pub fn from_slice(items: Vec<T>, page_number: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let page_number = page_number.max(1);
        let total_count = items.len() as u64;
        let skip = (page_number as usize - 1).saturating_mul(page_size as usize);
        let data: Vec<T> = items
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .collect();
        Self::new(data, page_number, page_size, total_count)
    }

    /// An empty first page.
    pub fn empty(page_size: u32) -> Self {
        Self::new(Vec::new(), 1, page_size, 0)
    }

    /// Repairs a decoded envelope so the invariant holds.
    ///
    /// Servers that omit `pageSize` get the requested size; a disagreeing
    /// `totalPages` is recomputed.
    pub fn normalized(mut self, requested_page: u32, requested_size: u32) -> Self {
        if self.page_size == 0 {
            self.page_size = requested_size.max(1);
        }
        if self.page_number == 0 {
            self.page_number = requested_page.max(1);
        }
        if (self.data.len() as u64) > self.total_count {
            self.total_count = self.data.len() as u64;
        }
        if self.data.len() > self.page_size as usize {
            log::warn!(
                "Page carried {} rows for page size {}, truncating",
                self.data.len(),
                self.page_size
            );
            self.data.truncate(self.page_size as usize);
        }
        let expected = total_pages(self.total_count, self.page_size);
        if self.total_pages != expected {
            log::warn!(
                "Server reported {} total pages for {} items at size {}, using {}",
                self.total_pages,
                self.total_count,
                self.page_size,
                expected
            );
            self.total_pages = expected;
        }
        self
    }

    /// Whether the invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.page_size > 0
            && self.total_pages == total_pages(self.total_count, self.page_size)
            && self.data.len() <= self.page_size as usize
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginationEnvelope<U> {
        PaginationEnvelope {
            data: self.data.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(53, 25), 3);
    }

    #[test]
    fn test_new_enforces_invariant() {
        let page = PaginationEnvelope::new((0..15).collect::<Vec<_>>(), 1, 10, 15);
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total_pages, 2);
        assert!(page.is_consistent());
    }

    #[test]
    fn test_from_slice_last_page() {
        let page = PaginationEnvelope::from_slice((1..=23).collect::<Vec<_>>(), 3, 10);
        assert_eq!(page.data, vec![21, 22, 23]);
        assert_eq!(page.total_count, 23);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_from_slice_past_end_is_empty() {
        let page = PaginationEnvelope::from_slice(vec![1, 2, 3], 5, 10);
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(page.is_consistent());
    }

    #[test]
    fn test_normalized_repairs_server_values() {
        let raw: PaginationEnvelope<u32> = serde_json::from_str(
            r#"{"data":[1,2,3],"totalCount":23,"totalPages":7}"#,
        )
        .unwrap();
        let page = raw.normalized(2, 10);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.total_pages, 3);
        assert!(page.is_consistent());
    }

    #[test]
    fn test_missing_page_number_takes_requested_page() {
        let raw: PaginationEnvelope<u32> = serde_json::from_str(
            r#"{"data":[11,12],"totalCount":12,"pageSize":10,"totalPages":2}"#,
        )
        .unwrap();
        let page = raw.normalized(2, 10);
        assert_eq!(page.page_number, 2);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn test_server_page_number_wins() {
        let raw: PaginationEnvelope<u32> = serde_json::from_str(
            r#"{"data":[1],"pageNumber":3,"pageSize":1,"totalCount":5,"totalPages":5}"#,
        )
        .unwrap();
        assert_eq!(raw.normalized(1, 1).page_number, 3);
    }

    #[test]
    fn test_normalized_truncates_oversized_page() {
        let raw = PaginationEnvelope {
            data: vec![1, 2, 3, 4],
            page_number: 1,
            page_size: 2,
            total_count: 4,
            total_pages: 2,
        };
        let page = raw.normalized(1, 2);
        assert_eq!(page.data, vec![1, 2]);
        assert!(page.is_consistent());
    }
}
