//! Range-header pagination for collection endpoints.
//!
//! Paged endpoints accept a `Range: items={start}-{end}` request header
//! (0-based, inclusive) and answer with a `Content-Range` header reporting
//! the returned window and the collection total. [`Pager`] walks a
//! collection window by window, terminating on whichever comes first:
//!
//! - the known total is reached, or
//! - a page comes back shorter than requested (the total reported earlier
//!   may be stale; a short page is authoritative).

/// One inclusive, 0-based item window, rendered into the `Range` request
/// header as `items={start}-{end}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// First item index in the window.
    pub start: u64,
    /// Last item index in the window, inclusive.
    pub end: u64,
}

impl PageWindow {
    /// The window of `page_size` items starting at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    pub fn new(position: u64, page_size: u64) -> Self {
        assert!(page_size > 0, "page size must be at least 1");
        PageWindow {
            start: position,
            end: position + page_size - 1,
        }
    }

    /// The `Range` header value for this window.
    pub fn header_value(&self) -> String {
        format!("items={}-{}", self.start, self.end)
    }

    /// Number of items the window requests.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always `false`; windows are at least one item wide.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The parsed `Content-Range` response header: which items came back and
/// how many exist in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// First returned item index.
    pub start: u64,
    /// Last returned item index, inclusive.
    pub end: u64,
    /// Total number of items in the collection, as reported by the server.
    pub total: u64,
}

impl ContentRange {
    /// Parses a `Content-Range` header value.
    ///
    /// Accepts the `items {start}-{end}/{total}` form the server sends, as
    /// well as the bare `{start}-{end}/{total}` and `items=` spellings.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let header = match header.strip_prefix("items") {
            Some(rest) => rest.trim_start_matches(['=', ' ']),
            None => header,
        };
        let (range, total) = header.split_once('/')?;
        let (start, end) = range.split_once('-')?;
        Some(ContentRange {
            start: start.trim().parse().ok()?,
            end: end.trim().parse().ok()?,
            total: total.trim().parse().ok()?,
        })
    }
}

/// Stateful cursor over a paged collection.
///
/// ```
/// use qradar_client::paging::Pager;
///
/// let mut pager = Pager::new(50);
/// while let Some(window) = pager.next_window() {
///     // let response = client.call(&request.range(window)).await?;
///     // let items: Vec<Item> = response.json()?;
///     # let (items, content_range): (Vec<u8>, Option<qradar_client::paging::ContentRange>) = (vec![], None);
///     pager.advance(items.len() as u64, content_range.as_ref());
/// }
/// ```
#[derive(Debug)]
pub struct Pager {
    page_size: u64,
    position: u64,
    total: Option<u64>,
    exhausted: bool,
}

impl Pager {
    /// Creates a pager that requests `page_size` items per window.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    pub fn new(page_size: u64) -> Self {
        assert!(page_size > 0, "page size must be at least 1");
        Pager {
            page_size,
            position: 0,
            total: None,
            exhausted: false,
        }
    }

    /// The next window to request, or `None` once the collection is
    /// exhausted. Does not advance; call [`advance`](Self::advance) after
    /// the page is fetched.
    pub fn next_window(&self) -> Option<PageWindow> {
        if self.exhausted {
            return None;
        }
        if let Some(total) = self.total {
            if self.position >= total {
                return None;
            }
        }
        Some(PageWindow::new(self.position, self.page_size))
    }

    /// Records a fetched page: the number of items actually returned, and
    /// the response's `Content-Range` when present (it teaches the pager
    /// the collection total).
    ///
    /// A short page — fewer items than the window requested — ends the
    /// enumeration immediately, even if the reported total says more
    /// remain.
    pub fn advance(&mut self, items_returned: u64, content_range: Option<&ContentRange>) {
        if let Some(range) = content_range {
            self.total = Some(range.total);
        }
        if items_returned < self.page_size {
            self.exhausted = true;
        }
        self.position += self.page_size;
    }

    /// The collection total learned from `Content-Range`, if any page has
    /// reported one yet.
    pub fn total(&self) -> Option<u64> {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_page_size_items_inclusively() {
        let window = PageWindow::new(5, 5);
        assert_eq!(window, PageWindow { start: 5, end: 9 });
        assert_eq!(window.len(), 5);
        assert_eq!(window.header_value(), "items=5-9");
    }

    #[test]
    fn content_range_parses_server_form() {
        let range = ContentRange::parse("items 0-4/23").unwrap();
        assert_eq!((range.start, range.end, range.total), (0, 4, 23));
    }

    #[test]
    fn content_range_parses_bare_and_equals_forms() {
        assert_eq!(
            ContentRange::parse("5-9/23").unwrap(),
            ContentRange { start: 5, end: 9, total: 23 }
        );
        assert_eq!(
            ContentRange::parse("items=10-14/23").unwrap(),
            ContentRange { start: 10, end: 14, total: 23 }
        );
    }

    #[test]
    fn content_range_rejects_garbage() {
        assert!(ContentRange::parse("").is_none());
        assert!(ContentRange::parse("items").is_none());
        assert!(ContentRange::parse("a-b/c").is_none());
        assert!(ContentRange::parse("0-4").is_none());
    }

    #[test]
    fn pager_enumerates_a_23_item_collection_in_5_item_windows() {
        // The final window extends past the total; the server just returns
        // a naturally short last page.
        let mut pager = Pager::new(5);
        let mut windows = Vec::new();
        let total = ContentRange { start: 0, end: 4, total: 23 };
        while let Some(window) = pager.next_window() {
            windows.push(window.header_value());
            let returned = window.len().min(23u64.saturating_sub(window.start));
            pager.advance(returned, Some(&total));
        }
        assert_eq!(
            windows,
            vec!["items=0-4", "items=5-9", "items=10-14", "items=15-19", "items=20-24"]
        );
    }

    #[test]
    fn short_page_stops_enumeration_before_the_reported_total() {
        // The server said 23 items, but the second page comes back with 3
        // of the 5 requested; the short page wins over the stale total.
        let mut pager = Pager::new(5);
        let total = ContentRange { start: 0, end: 4, total: 23 };

        let first = pager.next_window().unwrap();
        assert_eq!(first.header_value(), "items=0-4");
        pager.advance(5, Some(&total));

        let second = pager.next_window().unwrap();
        assert_eq!(second.header_value(), "items=5-9");
        pager.advance(3, Some(&total));

        assert_eq!(pager.next_window(), None);
    }

    #[test]
    fn pager_without_content_range_relies_on_short_page_alone() {
        let mut pager = Pager::new(10);
        pager.advance(10, None);
        assert!(pager.next_window().is_some(), "full page keeps going");
        pager.advance(0, None);
        assert_eq!(pager.next_window(), None, "empty page terminates");
    }

    #[test]
    fn exact_multiple_total_terminates_on_total() {
        let mut pager = Pager::new(5);
        let total = ContentRange { start: 0, end: 4, total: 10 };
        pager.advance(5, Some(&total));
        assert!(pager.next_window().is_some());
        pager.advance(5, Some(&total));
        assert_eq!(pager.next_window(), None, "position reached the total");
    }

    #[test]
    #[should_panic(expected = "page size")]
    fn zero_page_size_panics() {
        Pager::new(0);
    }
}
