//! Paged, server-filtered trip history.
//!
//! Unlike the live board, history is filtered and paginated by the source.
//! The view keeps the requested page and re-clamps it when the server
//! reports fewer matches than the page implies.

use std::sync::Arc;

use tripwatch_client::{ListTripsRequest, TripSource};
use tripwatch_query::{Pagination, QueryParams};
use tripwatch_state::Trip;

use crate::error::MonitorError;

pub struct HistoryView {
    source: Arc<dyn TripSource>,
    filter: QueryParams,
    pagination: Pagination,
    items: Vec<Trip>,
    last_error: Option<String>,
}

impl std::fmt::Debug for HistoryView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryView")
            .field("source", &self.source.source_name())
            .field("filter", &self.filter)
            .field("pagination", &self.pagination)
            .field("items", &self.items.len())
            .finish()
    }
}

impl HistoryView {
    pub fn new(source: Arc<dyn TripSource>, page_size: usize) -> Self {
        Self {
            source,
            filter: QueryParams::default(),
            pagination: Pagination::new(0, page_size, 1),
            items: Vec::new(),
            last_error: None,
        }
    }

    /// Replace the filter. The next load starts from page 1.
    pub fn set_filter(&mut self, filter: QueryParams) {
        self.filter = filter;
        self.pagination.go_to(1);
    }

    pub fn filter(&self) -> &QueryParams {
        &self.filter
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn items(&self) -> &[Trip] {
        &self.items
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Reload the current page.
    pub async fn reload(&mut self) -> Result<&[Trip], MonitorError> {
        let page = self.pagination.current_page();
        self.load_page(page).await
    }

    /// Load `page` (1-based). If the server has fewer pages than requested,
    /// the last existing page is loaded instead. On failure the previous
    /// items stay in place.
    pub async fn load_page(&mut self, page: usize) -> Result<&[Trip], MonitorError> {
        let requested = page.max(1);
        let mut fetched = self.fetch(requested).await?;

        self.pagination.set_total(fetched.total_count);
        self.pagination.go_to(requested);
        let clamped = self.pagination.current_page();
        if clamped != requested && fetched.total_count > 0 {
            tracing::debug!(requested, clamped, "history page out of range, reloading");
            fetched = self.fetch(clamped).await?;
            self.pagination.set_total(fetched.total_count);
            self.pagination.go_to(clamped);
        }

        self.items = fetched.items;
        Ok(&self.items)
    }

    async fn fetch(&mut self, page: usize) -> Result<tripwatch_client::TripPage, MonitorError> {
        let request = ListTripsRequest::new(self.filter.clone(), page, self.pagination.page_size());
        match self.source.list_trips(&request).await {
            Ok(fetched) => {
                self.last_error = None;
                Ok(fetched)
            }
            Err(e) => {
                tracing::warn!(page, "history fetch failed: {e}");
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}
