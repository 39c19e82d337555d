use serde::Serialize;

/// One element of the rendered page-link strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageLink {
    Page { number: i64, current: bool },
    Ellipsis,
}

/// A page of listing results plus the numbers the UI needs to draw
/// pagination controls.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total_records: i64,
    pub total_pages: i64,
    pub links: Vec<PageLink>,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, page: i64, per_page: i64, total_records: i64) -> Self {
        let total_pages = total_pages(total_records, per_page);
        Self {
            records,
            page,
            per_page,
            total_records,
            total_pages,
            links: window_links(page, total_pages),
            has_next: page < total_pages,
            has_prev: page > 1 && total_pages > 0,
        }
    }

    pub fn empty(page: i64, per_page: i64) -> Self {
        Self::new(vec![], page, per_page, 0)
    }

    /// Re-shape records for the response without disturbing the page math.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            records: self.records.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_records: self.total_records,
            total_pages: self.total_pages,
            links: self.links,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// ceil(total_records / per_page)
pub fn total_pages(total_records: i64, per_page: i64) -> i64 {
    if total_records <= 0 || per_page <= 0 {
        return 0;
    }
    (total_records + per_page - 1) / per_page
}

/// Windowed pagination links: up to 2 pages either side of the current page,
/// with first/last always shown and an ellipsis where the gap exceeds 1.
/// Emitted numbers never leave [1, total_pages].
pub fn window_links(page: i64, total_pages: i64) -> Vec<PageLink> {
    if total_pages <= 0 {
        return vec![];
    }

    let start = (page - 2).max(1);
    let end = (page + 2).min(total_pages);

    let mut links = Vec::new();
    if start > 1 {
        links.push(PageLink::Page { number: 1, current: page == 1 });
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }
    for number in start..=end {
        links.push(PageLink::Page { number, current: number == page });
    }
    if end < total_pages {
        if end < total_pages - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page { number: total_pages, current: false });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(links: &[PageLink]) -> Vec<i64> {
        links
            .iter()
            .filter_map(|l| match l {
                PageLink::Page { number, .. } => Some(*number),
                PageLink::Ellipsis => None,
            })
            .collect()
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(41, 20), 3);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(0, 20), 0);
    }

    #[test]
    fn window_centered_in_the_middle() {
        // page 5 of 10: 1 … 3 4 [5] 6 7 … 10
        let links = window_links(5, 10);
        assert_eq!(numbers(&links), vec![1, 3, 4, 5, 6, 7, 10]);
        assert_eq!(
            links.iter().filter(|l| matches!(l, PageLink::Ellipsis)).count(),
            2
        );
    }

    #[test]
    fn no_ellipsis_when_gap_is_one() {
        // page 4 of 7: window [2,6], gap to both ends is exactly 1
        let links = window_links(4, 7);
        assert_eq!(numbers(&links), vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(!links.iter().any(|l| matches!(l, PageLink::Ellipsis)));
    }

    #[test]
    fn window_clamped_at_the_edges() {
        assert_eq!(numbers(&window_links(1, 10)), vec![1, 2, 3, 10]);
        assert_eq!(numbers(&window_links(10, 10)), vec![1, 8, 9, 10]);
    }

    #[test]
    fn links_never_leave_valid_range() {
        for total in 0..=12 {
            for page in 1..=12 {
                for n in numbers(&window_links(page, total)) {
                    assert!(n >= 1 && n <= total, "page {} total {} emitted {}", page, total, n);
                }
            }
        }
    }

    #[test]
    fn single_page_has_one_link_and_no_next() {
        let page: Page<()> = Page::new(vec![], 1, 20, 5);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_prev);
        assert_eq!(numbers(&page.links), vec![1]);
    }

    #[test]
    fn forty_five_records_page_three_has_no_next() {
        let page: Page<()> = Page::new(vec![], 3, 20, 45);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_prev);
        assert_eq!(numbers(&page.links), vec![1, 2, 3]);
    }

    #[test]
    fn empty_listing_renders_no_links() {
        let page: Page<()> = Page::empty(1, 20);
        assert_eq!(page.total_pages, 0);
        assert!(page.links.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }
}
