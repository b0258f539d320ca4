use serde::{Deserialize, Serialize};

/// 1-based page cursor over an in-memory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_size: u32,
    pub page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 1,
        }
    }

    fn size(&self) -> usize {
        self.page_size.max(1) as usize
    }

    pub fn total_pages(&self, len: usize) -> u32 {
        let pages = len.div_ceil(self.size()).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Items `[(page-1)*size, page*size)`, clamped to the list bounds.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let size = self.size();
        let start = (self.page.max(1) as usize - 1).saturating_mul(size);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(size).min(items.len());
        &items[start..end]
    }

    pub fn go_to(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Pull a page past the end back onto the last page.
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.clamp(1, self.total_pages(len));
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slice_pages() {
        let items: Vec<u32> = (1..=25).collect();
        let mut p = Pagination::new(10);
        assert_eq!(p.slice(&items), &items[0..10]);
        p.go_to(3);
        assert_eq!(p.slice(&items), &[21, 22, 23, 24, 25]);
        p.go_to(4);
        assert!(p.slice(&items).is_empty());
    }

    #[test]
    fn test_total_pages_never_zero() {
        let p = Pagination::new(10);
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
    }

    #[test]
    fn test_clamp_and_reset() {
        let mut p = Pagination::new(5);
        p.go_to(9);
        p.clamp(12);
        assert_eq!(p.page, 3);
        p.clamp(0);
        assert_eq!(p.page, 1);
        p.go_to(0);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn test_zero_page_size_is_one() {
        let p = Pagination {
            page_size: 0,
            page: 2,
        };
        assert_eq!(p.slice(&[7, 8, 9]), &[8]);
        assert_eq!(Pagination::new(0).page_size, 1);
    }

    proptest! {
        #[test]
        fn prop_pages_reconstruct_list(items in proptest::collection::vec(any::<u16>(), 0..200), size in 1u32..30) {
            let mut p = Pagination::new(size);
            let mut rebuilt = Vec::new();
            for page in 1..=p.total_pages(items.len()) {
                p.go_to(page);
                let slice = p.slice(&items);
                prop_assert!(slice.len() <= size as usize);
                rebuilt.extend_from_slice(slice);
            }
            prop_assert_eq!(rebuilt, items);
        }
    }
}
