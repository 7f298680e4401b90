use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_INDEX: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page request, 1-based. Missing or non-positive values fall back to the defaults.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PaginationParams {
    pub page_index: u32,
    pub page_size: u32,
}

impl PaginationParams {
    pub fn new(page_index: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page_index: clamp(page_index, DEFAULT_PAGE_INDEX),
            page_size: clamp(page_size, DEFAULT_PAGE_SIZE),
        }
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page_index: DEFAULT_PAGE_INDEX, page_size: DEFAULT_PAGE_SIZE }
    }
}

fn clamp(value: Option<i64>, default: u32) -> u32 {
    match value {
        Some(v) if v >= 1 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => default,
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
}

impl From<PaginationQuery> for PaginationParams {
    fn from(q: PaginationQuery) -> Self {
        Self::new(q.page_index, q.page_size)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub page_index: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PaginatedList<T> {
    pub fn new(items: Vec<T>, count: usize, page_index: u32, page_size: u32) -> Self {
        let total_pages = (count as f64 / f64::from(page_size.max(1))).ceil() as u32;
        Self {
            items,
            page_index,
            page_size,
            total_pages,
            has_previous_page: page_index > 1,
            has_next_page: page_index < total_pages,
        }
    }

    /// Cuts one page out of an already loaded, already ordered list.
    pub fn from_vec(source: Vec<T>, params: PaginationParams) -> Self {
        let PaginationParams { page_index, page_size } = params;
        let count = source.len();
        let offset = (page_index.saturating_sub(1) as usize).saturating_mul(page_size as usize);
        let items = source.into_iter().skip(offset).take(page_size as usize).collect();
        Self::new(items, count, page_index, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, page_index: u32, page_size: u32) -> PaginatedList<usize> {
        PaginatedList::from_vec((0..n).collect(), PaginationParams { page_index, page_size })
    }

    #[test]
    fn middle_page_of_25() {
        let p = page(25, 2, 10);
        assert_eq!(p.items, (10..20).collect::<Vec<_>>());
        assert_eq!(p.total_pages, 3);
        assert!(p.has_previous_page);
        assert!(p.has_next_page);
    }

    #[test]
    fn last_partial_page_of_15() {
        let p = page(15, 2, 10);
        assert_eq!(p.items, (10..15).collect::<Vec<_>>());
        assert_eq!(p.total_pages, 2);
        assert!(p.has_previous_page);
        assert!(!p.has_next_page);
    }

    #[test]
    fn empty_source_has_no_pages() {
        let p = page(0, 1, 10);
        assert!(p.items.is_empty());
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_previous_page);
        assert!(!p.has_next_page);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let p = page(15, 5, 10);
        assert!(p.items.is_empty());
        assert_eq!(p.total_pages, 2);
        assert!(p.has_previous_page);
        assert!(!p.has_next_page);
    }

    #[test]
    fn item_count_matches_formula() {
        for n in 0..40usize {
            for size in 1..7u32 {
                for index in 1..10u32 {
                    let p = page(n, index, size);
                    let offset = (index as usize - 1) * size as usize;
                    let expected = n.saturating_sub(offset).min(size as usize);
                    assert_eq!(p.items.len(), expected, "n={n} size={size} index={index}");
                    assert_eq!(p.total_pages as usize, n.div_ceil(size as usize));
                    assert_eq!(p.has_previous_page, index > 1);
                    assert_eq!(p.has_next_page, index < p.total_pages);
                }
            }
        }
    }

    #[test]
    fn same_input_same_page() {
        assert_eq!(page(23, 3, 4), page(23, 3, 4));
    }

    #[test]
    fn params_fall_back_to_defaults() {
        assert_eq!(PaginationParams::new(None, None), PaginationParams::default());
        assert_eq!(
            PaginationParams::new(Some(0), Some(-3)),
            PaginationParams { page_index: 1, page_size: 10 }
        );
        assert_eq!(
            PaginationParams::new(Some(4), Some(25)),
            PaginationParams { page_index: 4, page_size: 25 }
        );
    }
}
