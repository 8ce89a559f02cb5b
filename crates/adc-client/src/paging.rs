//! Paged search aggregation.

use adc_directory::{
    DirectoryCapability, DirectoryError, DirectoryResult, Entry, PagingState, SearchSpec,
};

use crate::session::SessionManager;

/// Accumulates every page of a paged search.
///
/// Each page is one call through the session, so each page gets the
/// single-retry policy on its own.
pub struct PaginatedSearchAggregator<'a, D> {
    session: &'a SessionManager<D>,
    page_size: u32,
    max_pages: Option<usize>,
}

impl<'a, D: DirectoryCapability> PaginatedSearchAggregator<'a, D> {
    /// Creates an aggregator without a page ceiling.
    #[must_use]
    pub const fn new(session: &'a SessionManager<D>, page_size: u32) -> Self {
        Self {
            session,
            page_size,
            max_pages: None,
        }
    }

    /// Sets the maximum number of pages to fetch.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Runs `spec` page by page and returns all entries in directory order.
    ///
    /// Stops when a response carries no paging control or an empty cookie.
    ///
    /// ## Errors
    ///
    /// Any page failure aborts the listing. With a ceiling configured,
    /// needing more pages than allowed fails with
    /// [`DirectoryError::PageLimitExceeded`].
    pub async fn list_all(&self, spec: &SearchSpec) -> DirectoryResult<Vec<Entry>> {
        let mut paging = PagingState::new(self.page_size);
        let mut entries = Vec::new();
        let mut pages = 0usize;

        loop {
            if let Some(max) = self.max_pages {
                if pages >= max {
                    tracing::warn!(filter = %spec.filter, max, "paged search exceeded page limit");
                    return Err(DirectoryError::PageLimitExceeded(max));
                }
            }

            let request = &paging;
            let page = self
                .session
                .execute("paged search", |d| async move { d.search(spec, Some(request)).await })
                .await?;
            pages += 1;

            tracing::debug!(
                filter = %spec.filter,
                page = pages,
                count = page.entries.len(),
                "received search page"
            );
            entries.extend(page.entries);

            match page.paging {
                Some(next) if !next.is_complete() => paging.cookie = next.cookie,
                _ => break,
            }
        }

        Ok(entries)
    }
}
