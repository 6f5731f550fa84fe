use crate::models::PaginationEnvelope;

/// One slot in the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page { number: u32, current: bool },
    Ellipsis,
}

/// Footer under a paginated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationFooter {
    /// 1-based index of the first row shown, 0 when there are none.
    pub first_item: u64,
    pub last_item: u64,
    pub total_count: u64,
    pub page_number: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub pages: Vec<PageItem>,
}

impl PaginationFooter {
    pub fn from_envelope<T>(page: &PaginationEnvelope<T>) -> Self {
        let shown = page.data.len() as u64;
        let offset = u64::from(page.page_number.saturating_sub(1)) * u64::from(page.page_size);
        let (first_item, last_item) = if shown == 0 {
            (0, 0)
        } else {
            (offset + 1, offset + shown)
        };
        Self {
            first_item,
            last_item,
            total_count: page.total_count,
            page_number: page.page_number,
            total_pages: page.total_pages,
            has_previous: page.page_number > 1,
            has_next: page.page_number < page.total_pages,
            pages: page_window(page.page_number, page.total_pages),
        }
    }

    /// `Showing 11–20 of 45`.
    pub fn range_label(&self) -> String {
        if self.total_count == 0 {
            return "No results".to_string();
        }
        format!(
            "Showing {}\u{2013}{} of {}",
            self.first_item, self.last_item, self.total_count
        )
    }

    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous.then(|| self.page_number - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next.then(|| self.page_number + 1)
    }
}

/// First page, last page and the current page with its neighbours.
///
/// A gap of a single page shows that page; longer gaps collapse into an
/// ellipsis.
pub fn page_window(current: u32, total: u32) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total);
    let mut wanted: Vec<u32> = vec![1, total, current];
    wanted.extend([current.saturating_sub(1), current + 1]);
    wanted.retain(|n| (1..=total).contains(n));
    wanted.sort_unstable();
    wanted.dedup();

    let mut items = Vec::with_capacity(wanted.len() + 2);
    let mut prev = 0;
    for n in wanted {
        match n - prev {
            1 => {}
            2 => items.push(PageItem::Page {
                number: n - 1,
                current: false,
            }),
            _ => items.push(PageItem::Ellipsis),
        }
        items.push(PageItem::Page {
            number: n,
            current: n == current,
        });
        prev = n;
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(items: &[PageItem]) -> String {
        items
            .iter()
            .map(|item| match item {
                PageItem::Page { number, current: true } => format!("[{}]", number),
                PageItem::Page { number, .. } => number.to_string(),
                PageItem::Ellipsis => "…".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_page_window() {
        assert_eq!(render(&page_window(1, 1)), "[1]");
        assert_eq!(render(&page_window(1, 10)), "[1] 2 … 10");
        assert_eq!(render(&page_window(5, 10)), "1 … 4 [5] 6 … 10");
        assert_eq!(render(&page_window(3, 10)), "1 2 [3] 4 … 10");
        assert_eq!(render(&page_window(10, 10)), "1 … 9 [10]");
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_footer_range() {
        let page = PaginationEnvelope::new(vec![(); 5], 3, 10, 25);
        let footer = PaginationFooter::from_envelope(&page);
        assert_eq!(footer.range_label(), "Showing 21–25 of 25");
        assert_eq!(footer.previous_page(), Some(2));
        assert_eq!(footer.next_page(), None);
    }

    #[test]
    fn test_empty_footer() {
        let footer = PaginationFooter::from_envelope(&PaginationEnvelope::<()>::empty(10));
        assert_eq!(footer.range_label(), "No results");
        assert!(!footer.has_previous && !footer.has_next);
    }
}
