use std::collections::HashSet;

/// Walks a listing by following its "next" links
///
/// Pages are identified by URL, so a listing whose last page links back to
/// an earlier one still terminates.
pub struct ListingCursor {
    next_url: Option<String>,
    visited: HashSet<String>,
    pages_taken: usize,
    max_pages: Option<usize>,
}

impl ListingCursor {
    pub fn new(start_url: String, max_pages: Option<usize>) -> Self {
        Self {
            next_url: Some(start_url),
            visited: HashSet::new(),
            pages_taken: 0,
            max_pages,
        }
    }

    /// Next page to fetch, or `None` once the listing is exhausted
    pub fn next_page(&mut self) -> Option<String> {
        if self.has_reached_max() {
            return None;
        }
        let url = self.next_url.take()?;
        if !self.visited.insert(url.clone()) {
            return None;
        }
        self.pages_taken += 1;
        Some(url)
    }

    /// Record the link to the page after the one just fetched
    pub fn follow(&mut self, next: Option<String>) {
        self.next_url = next;
    }

    pub fn pages_taken(&self) -> usize {
        self.pages_taken
    }

    fn has_reached_max(&self) -> bool {
        self.max_pages
            .is_some_and(|max| self.pages_taken >= max)
    }
}
