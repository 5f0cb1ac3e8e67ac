pub const RESTAURANT_PAGE_SIZE: i64 = 6;
pub const SEARCH_PAGE_SIZE: i64 = 25;

/// 1-based page request; pages below 1 are treated as the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: i32, size: i64) -> Self {
        Self {
            page: i64::from(page.max(1)),
            size,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.size - 1) / self.size
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_results: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_one_based() {
        assert_eq!(PageRequest::new(1, 6).offset(), 0);
        assert_eq!(PageRequest::new(3, 6).offset(), 12);
        assert_eq!(PageRequest::new(0, 6).offset(), 0);
        assert_eq!(PageRequest::new(-4, 25).offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(1, 6);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(6), 1);
        assert_eq!(req.total_pages(7), 2);
        assert_eq!(PageRequest::new(1, 25).total_pages(51), 3);
    }
}
