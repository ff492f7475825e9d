//! Paginator and pagination-control model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::RecordKey;

/// Rows per page. `All` shows every row on a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    Rows(usize),
    All,
}

impl Default for PageSize {
    fn default() -> Self {
        Self::Rows(50)
    }
}

impl PageSize {
    /// The selector's fixed choices.
    pub const CHOICES: [PageSize; 4] = [
        PageSize::Rows(25),
        PageSize::Rows(50),
        PageSize::Rows(100),
        PageSize::All,
    ];

    /// From a configured value; `0` means show all.
    pub fn from_value(value: usize) -> Self {
        match value {
            0 => Self::All,
            n => Self::Rows(n),
        }
    }

    pub fn value(&self) -> usize {
        match self {
            Self::Rows(n) => *n,
            Self::All => 0,
        }
    }

    /// Next selector choice, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::CHOICES.iter().position(|c| *c == self);
        match index {
            Some(i) => Self::CHOICES[(i + 1) % Self::CHOICES.len()],
            None => Self::default(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Rows(n) => n.to_string(),
            Self::All => String::from("All"),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One page worth of keys plus page-count metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub keys: Vec<RecordKey>,
    /// The page actually shown, after clamping.
    pub page_number: usize,
    pub total_pages: usize,
    /// Offset of the first key in the full ordered sequence.
    pub start: usize,
}

/// Page count for `len` rows; at least 1.
pub fn total_pages(len: usize, size: PageSize) -> usize {
    match size {
        PageSize::All | PageSize::Rows(0) => 1,
        PageSize::Rows(n) => len.div_ceil(n).max(1),
    }
}

/// Clamp a requested page into `[1, total]`.
pub fn clamp_page(requested: usize, total: usize) -> usize {
    requested.clamp(1, total.max(1))
}

/// Slice `ordered` to the requested page, clamping out-of-range requests.
pub fn paginate(ordered: &[RecordKey], size: PageSize, requested: usize) -> Page {
    let total = total_pages(ordered.len(), size);
    let page_number = clamp_page(requested, total);

    let (start, end) = match size {
        PageSize::All | PageSize::Rows(0) => (0, ordered.len()),
        PageSize::Rows(n) => {
            let start = ((page_number - 1) * n).min(ordered.len());
            (start, (start + n).min(ordered.len()))
        }
    };

    Page {
        keys: ordered[start..end].to_vec(),
        page_number,
        total_pages: total,
        start,
    }
}

/// An element of the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Previous { enabled: bool },
    Number { page: usize, active: bool },
    Ellipsis,
    Next { enabled: bool },
}

impl PageLink {
    /// Page this link navigates to, if it is actionable.
    pub fn target(&self, current: usize) -> Option<usize> {
        match *self {
            Self::Previous { enabled: true } => Some(current - 1),
            Self::Next { enabled: true } => Some(current + 1),
            Self::Number { page, active: false } => Some(page),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Previous { .. } => String::from("«"),
            Self::Next { .. } => String::from("»"),
            Self::Number { page, .. } => page.to_string(),
            Self::Ellipsis => String::from("…"),
        }
    }
}

const WINDOW: usize = 5;

/// Pagination control for the current page.
///
/// At most five numbered links centered on `current`, with first/last
/// shortcuts and ellipses where the window does not reach an edge.
/// `None` when everything fits on one page.
pub fn page_links(current: usize, total: usize, size: PageSize) -> Option<Vec<PageLink>> {
    if size == PageSize::All || total <= 1 {
        return None;
    }

    let current = clamp_page(current, total);
    let mut start = current.saturating_sub(2).max(1);
    let end = (start + WINDOW - 1).min(total);
    if end - start + 1 < WINDOW {
        start = end.saturating_sub(WINDOW - 1).max(1);
    }

    let mut links = vec![PageLink::Previous {
        enabled: current > 1,
    }];

    if start > 1 {
        links.push(PageLink::Number {
            page: 1,
            active: false,
        });
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }

    links.extend((start..=end).map(|page| PageLink::Number {
        page,
        active: page == current,
    }));

    if end < total {
        if end < total - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Number {
            page: total,
            active: false,
        });
    }

    links.push(PageLink::Next {
        enabled: current < total,
    });
    Some(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<RecordKey> {
        (0..n).map(RecordKey).collect()
    }

    fn numbers(links: &[PageLink]) -> Vec<String> {
        links.iter().map(PageLink::label).collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, PageSize::Rows(50)), 1);
        assert_eq!(total_pages(120, PageSize::Rows(50)), 3);
        assert_eq!(total_pages(100, PageSize::Rows(50)), 2);
        assert_eq!(total_pages(120, PageSize::All), 1);
    }

    #[test]
    fn test_first_page_and_show_all() {
        let ordered = keys(120);

        let page = paginate(&ordered, PageSize::Rows(50), 1);
        assert_eq!(page.keys, ordered[..50]);
        assert_eq!(page.total_pages, 3);

        let all = paginate(&ordered, PageSize::All, 3);
        assert_eq!(all.keys.len(), 120);
        assert_eq!(all.page_number, 1);
    }

    #[test]
    fn test_pages_concatenate_to_sequence() {
        let ordered = keys(103);
        for size in [1, 7, 25, 50, 103, 200] {
            let size = PageSize::Rows(size);
            let total = total_pages(ordered.len(), size);
            let joined: Vec<RecordKey> = (1..=total)
                .flat_map(|n| paginate(&ordered, size, n).keys)
                .collect();
            assert_eq!(joined, ordered);
        }
    }

    #[test]
    fn test_out_of_range_clamps() {
        let ordered = keys(120);
        let page = paginate(&ordered, PageSize::Rows(50), 9);
        assert_eq!(page.page_number, 3);
        assert_eq!(page.keys, ordered[100..]);
        assert_eq!(page.start, 100);

        let zero = paginate(&ordered, PageSize::Rows(50), 0);
        assert_eq!(zero.page_number, 1);

        let empty = paginate(&[], PageSize::Rows(50), 4);
        assert_eq!(empty.page_number, 1);
        assert!(empty.keys.is_empty());
    }

    #[test]
    fn test_page_size_cycle() {
        assert_eq!(PageSize::Rows(25).next(), PageSize::Rows(50));
        assert_eq!(PageSize::Rows(100).next(), PageSize::All);
        assert_eq!(PageSize::All.next(), PageSize::Rows(25));
        assert_eq!(PageSize::from_value(0), PageSize::All);
    }

    #[test]
    fn test_links_omitted() {
        assert_eq!(page_links(1, 1, PageSize::Rows(50)), None);
        assert_eq!(page_links(1, 3, PageSize::All), None);
    }

    #[test]
    fn test_links_small_total() {
        let links = page_links(1, 3, PageSize::Rows(50)).unwrap();
        assert_eq!(links[0], PageLink::Previous { enabled: false });
        assert_eq!(numbers(&links), vec!["«", "1", "2", "3", "»"]);
        assert_eq!(links[4], PageLink::Next { enabled: true });
    }

    #[test]
    fn test_links_window_with_ellipses() {
        let middle = page_links(10, 20, PageSize::Rows(25)).unwrap();
        assert_eq!(
            numbers(&middle),
            vec!["«", "1", "…", "8", "9", "10", "11", "12", "…", "20", "»"]
        );
        assert!(middle.contains(&PageLink::Number {
            page: 10,
            active: true
        }));

        let near_end = page_links(20, 20, PageSize::Rows(25)).unwrap();
        assert_eq!(
            numbers(&near_end),
            vec!["«", "1", "…", "16", "17", "18", "19", "20", "»"]
        );
        assert_eq!(near_end.last(), Some(&PageLink::Next { enabled: false }));

        // Window touching page 2 needs no leading ellipsis
        let early = page_links(4, 20, PageSize::Rows(25)).unwrap();
        assert_eq!(
            numbers(&early),
            vec!["«", "1", "2", "3", "4", "5", "6", "…", "20", "»"]
        );
    }

    #[test]
    fn test_link_targets() {
        assert_eq!(PageLink::Previous { enabled: true }.target(3), Some(2));
        assert_eq!(PageLink::Next { enabled: false }.target(3), None);
        assert_eq!(PageLink::Number { page: 7, active: false }.target(3), Some(7));
        assert_eq!(PageLink::Ellipsis.target(3), None);
    }
}
