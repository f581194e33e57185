use serde::Deserialize;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// One-based page selector for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    /// Creates a page selector, clamping to `page >= 1` and `1..=100` rows.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Returns a copy with the bounds applied; query strings bypass `new`.
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_has_zero_offset() {
        let page = Page::default();
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(Page::new(3, 20).offset(), 40);
    }

    #[test]
    fn bounds_are_clamped() {
        let page = Page::new(0, 1000);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 100);
        assert_eq!(Page { page: 0, page_size: 0 }.normalized(), Page::new(1, 1));
    }
}
