//! Page state for the log list.
//!
//! The controller never edits page numbers directly in response to a fetch;
//! it hands out [`FetchTicket`]s and applies results only for the most
//! recently issued ticket. A slower, older response arriving last is
//! discarded instead of overwriting newer state.

use serde::Serialize;

pub const PAGE_SIZE: i64 = 25;

/// `max(1, ceil(total_count / page_size))`
pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if total_count <= 0 || page_size <= 0 {
        return 1;
    }
    (total_count + page_size - 1) / page_size
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub current_page: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub page_size: i64,
}

impl PaginationState {
    pub fn new(page_size: i64) -> Self {
        Self {
            current_page: 1,
            total_count: 0,
            total_pages: 1,
            page_size,
        }
    }

    /// 1-based `(first, last)` row numbers shown on the current page, for
    /// the "Showing X to Y of Z" summary. `(0, 0)` when nothing matches.
    pub fn showing_range(&self) -> (i64, i64) {
        if self.total_count == 0 {
            return (0, 0);
        }
        let first = (self.current_page - 1) * self.page_size + 1;
        let last = (self.current_page * self.page_size).min(self.total_count);
        (first.min(last), last)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPhase {
    Idle,
    Loading,
}

/// Handle for one triggered fetch of `page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    pub page: i64,
}

#[derive(Debug)]
pub struct PaginationController {
    state: PaginationState,
    phase: FetchPhase,
    last_error: Option<String>,
    issued: u64,
}

impl PaginationController {
    pub fn new(page_size: i64) -> Self {
        Self {
            state: PaginationState::new(page_size.max(1)),
            phase: FetchPhase::Idle,
            last_error: None,
            issued: 0,
        }
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    /// Message of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Filters were replaced: back to page 1 immediately, then fetch it.
    pub fn filters_changed(&mut self) -> FetchTicket {
        self.state.current_page = 1;
        self.issue(1)
    }

    /// Fetch `page`, or `None` when it lies outside `1..=total_pages`.
    pub fn request_page(&mut self, page: i64) -> Option<FetchTicket> {
        if page < 1 || page > self.state.total_pages {
            return None;
        }
        Some(self.issue(page))
    }

    /// Re-run the fetch for the page on display.
    pub fn refresh(&mut self) -> FetchTicket {
        self.issue(self.state.current_page)
    }

    pub fn first(&mut self) -> Option<FetchTicket> {
        self.request_page(1)
    }

    pub fn prev(&mut self) -> Option<FetchTicket> {
        self.request_page(self.state.current_page - 1)
    }

    pub fn next(&mut self) -> Option<FetchTicket> {
        self.request_page(self.state.current_page + 1)
    }

    pub fn last(&mut self) -> Option<FetchTicket> {
        self.request_page(self.state.total_pages)
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.issued
    }

    /// Apply a successful fetch. `page` is the page actually served, which
    /// may be lower than the ticket's if the result set shrank. Returns
    /// `false` and changes nothing if the ticket is stale.
    pub fn settle_success(&mut self, ticket: FetchTicket, total_count: i64, page: i64) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(seq = ticket.seq, latest = self.issued, "discarding stale page result");
            return false;
        }
        let total_count = total_count.max(0);
        self.state.total_count = total_count;
        self.state.total_pages = total_pages(total_count, self.state.page_size);
        self.state.current_page = page.clamp(1, self.state.total_pages);
        self.phase = FetchPhase::Idle;
        self.last_error = None;
        true
    }

    /// Record a failed fetch. Page state is left as it was.
    pub fn settle_failure(&mut self, ticket: FetchTicket, message: impl Into<String>) -> bool {
        if !self.is_current(&ticket) {
            return false;
        }
        self.phase = FetchPhase::Idle;
        self.last_error = Some(message.into());
        true
    }

    fn issue(&mut self, page: i64) -> FetchTicket {
        self.issued += 1;
        self.phase = FetchPhase::Loading;
        FetchTicket {
            seq: self.issued,
            page,
        }
    }
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_has_floor_of_one() {
        assert_eq!(total_pages(0, 25), 1);
        assert_eq!(total_pages(1, 25), 1);
        assert_eq!(total_pages(25, 25), 1);
        assert_eq!(total_pages(26, 25), 2);
        assert_eq!(total_pages(30, 25), 2);
        assert_eq!(total_pages(51, 25), 3);
        for count in 0..200 {
            let expected = std::cmp::max(1, (count as f64 / 25.0).ceil() as i64);
            assert_eq!(total_pages(count, 25), expected, "count = {count}");
        }
    }

    #[test]
    fn out_of_range_requests_are_noops() {
        let mut ctl = PaginationController::default();
        let t = ctl.filters_changed();
        assert!(ctl.settle_success(t, 30, 1));

        assert_eq!(ctl.request_page(0), None);
        assert_eq!(ctl.request_page(3), None);
        assert_eq!(ctl.prev(), None);
        assert_eq!(ctl.phase(), FetchPhase::Idle);

        let t = ctl.next().unwrap();
        assert_eq!(t.page, 2);
        assert!(ctl.is_loading());
        assert!(ctl.settle_success(t, 30, 2));
        assert_eq!(ctl.state().current_page, 2);
        assert_eq!(ctl.next(), None);
    }

    #[test]
    fn filter_change_resets_page_before_fetch_resolves() {
        let mut ctl = PaginationController::default();
        let t = ctl.filters_changed();
        ctl.settle_success(t, 100, 1);
        let t = ctl.last().unwrap();
        ctl.settle_success(t, 100, 4);
        assert_eq!(ctl.state().current_page, 4);

        let t = ctl.filters_changed();
        assert_eq!(ctl.state().current_page, 1);
        assert_eq!(t.page, 1);
        assert!(ctl.is_loading());
    }

    #[test]
    fn stale_tickets_are_discarded() {
        let mut ctl = PaginationController::default();
        let t = ctl.filters_changed();
        ctl.settle_success(t, 60, 1);

        let older = ctl.request_page(3).unwrap();
        let newer = ctl.filters_changed();

        assert!(ctl.settle_success(newer, 5, 1));
        assert!(!ctl.settle_success(older, 60, 3));
        assert!(!ctl.settle_failure(older, "late"));
        assert_eq!(ctl.state().current_page, 1);
        assert_eq!(ctl.state().total_count, 5);
        assert_eq!(ctl.last_error(), None);
    }

    #[test]
    fn failure_keeps_previous_state() {
        let mut ctl = PaginationController::default();
        let t = ctl.filters_changed();
        ctl.settle_success(t, 60, 1);
        let t = ctl.request_page(2).unwrap();
        assert!(ctl.settle_failure(t, "boom"));

        assert_eq!(ctl.phase(), FetchPhase::Idle);
        assert_eq!(ctl.state().current_page, 1);
        assert_eq!(ctl.state().total_pages, 3);
        assert_eq!(ctl.last_error(), Some("boom"));
    }

    #[test]
    fn showing_range_summary() {
        let mut state = PaginationState::new(25);
        assert_eq!(state.showing_range(), (0, 0));
        state.total_count = 30;
        state.total_pages = 2;
        assert_eq!(state.showing_range(), (1, 25));
        state.current_page = 2;
        assert_eq!(state.showing_range(), (26, 30));
    }
}
