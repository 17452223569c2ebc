//! Fetching pages of logs, and the dashboard session that drives it.

use serde::Serialize;

use crate::error::AppError;
use crate::filter::LogFilters;
use crate::models::LogRecord;
use crate::pagination::{total_pages, FetchTicket, PaginationController, PaginationState, PAGE_SIZE};
use crate::query::{build_predicates, LogQuery, RowWindow};
use crate::store::SharedStore;

/// One page of results together with the count it was computed against.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedPage {
    pub logs: Vec<LogRecord>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct ListFetcher {
    store: SharedStore,
    page_size: i64,
}

impl ListFetcher {
    pub fn new(store: SharedStore) -> Self {
        Self::with_page_size(store, PAGE_SIZE)
    }

    pub fn with_page_size(store: SharedStore, page_size: i64) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Count, then load the window for `page`. A page past the end of the
    /// result set is pulled back to the last page. If either request
    /// fails the whole fetch fails; nothing is retried.
    pub async fn fetch(&self, filters: &LogFilters, page: i64) -> Result<FetchedPage, AppError> {
        let predicates = build_predicates(filters);

        let total = self.store.count(&predicates).await?;
        let pages = total_pages(total, self.page_size);
        let page = page.clamp(1, pages);

        let query = LogQuery::new(predicates).with_window(RowWindow::for_page(page, self.page_size));
        let logs = self.store.query(&query).await?;

        Ok(FetchedPage {
            logs,
            total,
            page,
            per_page: self.page_size,
            total_pages: pages,
        })
    }
}

/// An operator's view of the log list: the active filters, page state and
/// the records on display.
///
/// Records are held only for the page being shown; every navigation or
/// filter change goes back to the store.
pub struct LogBrowser {
    fetcher: ListFetcher,
    filters: LogFilters,
    pagination: PaginationController,
    logs: Vec<LogRecord>,
}

impl LogBrowser {
    pub fn new(fetcher: ListFetcher) -> Self {
        let page_size = fetcher.page_size();
        Self {
            fetcher,
            filters: LogFilters::default(),
            pagination: PaginationController::new(page_size),
            logs: Vec::new(),
        }
    }

    pub fn filters(&self) -> &LogFilters {
        &self.filters
    }

    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination.state()
    }

    pub fn is_loading(&self) -> bool {
        self.pagination.is_loading()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.pagination.last_error()
    }

    /// Initial load with empty filters.
    pub async fn open(&mut self) {
        let ticket = self.pagination.filters_changed();
        self.run(ticket).await;
    }

    /// Replace the filters wholesale and reload from page 1.
    pub async fn set_filters(&mut self, filters: LogFilters) {
        let ticket = self.replace_filters(filters);
        self.run(ticket).await;
    }

    /// Returns `false` without fetching if `page` is out of range.
    pub async fn request_page(&mut self, page: i64) -> bool {
        match self.pagination.request_page(page) {
            Some(ticket) => {
                self.run(ticket).await;
                true
            }
            None => false,
        }
    }

    pub async fn first_page(&mut self) -> bool {
        self.request_page(1).await
    }

    pub async fn prev_page(&mut self) -> bool {
        self.request_page(self.pagination.state().current_page - 1).await
    }

    pub async fn next_page(&mut self) -> bool {
        self.request_page(self.pagination.state().current_page + 1).await
    }

    pub async fn last_page(&mut self) -> bool {
        self.request_page(self.pagination.state().total_pages).await
    }

    pub async fn refresh(&mut self) {
        let ticket = self.pagination.refresh();
        self.run(ticket).await;
    }

    /// Replace the filters and issue a ticket for page 1 without fetching.
    /// Pair with [`LogBrowser::begin_fetch`] and
    /// [`LogBrowser::complete_fetch`] when fetches may overlap.
    pub fn replace_filters(&mut self, filters: LogFilters) -> FetchTicket {
        self.filters = filters;
        self.pagination.filters_changed()
    }

    /// Issue a ticket for `page` without fetching; `None` if out of range.
    pub fn begin_fetch(&mut self, page: i64) -> Option<FetchTicket> {
        self.pagination.request_page(page)
    }

    /// Run the fetch for `ticket` against the current filters.
    pub async fn load(&self, ticket: FetchTicket) -> Result<FetchedPage, AppError> {
        self.fetcher.fetch(&self.filters, ticket.page).await
    }

    /// Apply the outcome of a fetch. Results for anything but the latest
    /// ticket are dropped; failures leave the previous page on display.
    /// Returns whether the outcome was applied.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchedPage, AppError>,
    ) -> bool {
        match result {
            Ok(page) => {
                let applied = self
                    .pagination
                    .settle_success(ticket, page.total, page.page);
                if applied {
                    self.logs = page.logs;
                }
                applied
            }
            Err(e) => {
                tracing::error!("Error fetching logs: {e}");
                self.pagination.settle_failure(ticket, e.to_string())
            }
        }
    }

    async fn run(&mut self, ticket: FetchTicket) {
        let result = self.load(ticket).await;
        self.complete_fetch(ticket, result);
    }
}
