use serde::{Deserialize, Serialize};
use ticketdesk_common::models::{Priority, TicketStatus};

use crate::engine::EnrichedTicket;

pub const PAGE_SIZE: usize = 10;

/// List screen filter state. Every filter change resets the page to 1.
///
/// `priority` and `status` are applied by the gateway when tickets are
/// fetched; `company` and `only_mine` are applied locally by [`view`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    priority: Option<Priority>,
    status: Option<TicketStatus>,
    company: Option<String>,
    only_mine: bool,
    viewer_id: Option<String>,
    page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            priority: None,
            status: None,
            company: None,
            only_mine: false,
            viewer_id: None,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn for_viewer(viewer_id: impl Into<String>) -> Self {
        Self {
            viewer_id: Some(viewer_id.into()),
            ..Self::default()
        }
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn status(&self) -> Option<TicketStatus> {
        self.status
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn only_mine(&self) -> bool {
        self.only_mine
    }

    pub fn viewer_id(&self) -> Option<&str> {
        self.viewer_id.as_deref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns `true` when the change needs a re-fetch from the gateway.
    pub fn set_priority(&mut self, priority: Option<Priority>) -> bool {
        let changed = self.priority != priority;
        self.priority = priority;
        self.page = 1;
        changed
    }

    /// Returns `true` when the change needs a re-fetch from the gateway.
    pub fn set_status(&mut self, status: Option<TicketStatus>) -> bool {
        let changed = self.status != status;
        self.status = status;
        self.page = 1;
        changed
    }

    pub fn set_company(&mut self, company: Option<String>) {
        self.company = company.filter(|c| !c.trim().is_empty());
        self.page = 1;
    }

    pub fn set_only_mine(&mut self, only_mine: bool) {
        self.only_mine = only_mine;
        self.page = 1;
    }

    pub fn set_viewer(&mut self, viewer_id: Option<String>) {
        self.viewer_id = viewer_id;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    fn admits(&self, ticket: &EnrichedTicket) -> bool {
        if self.only_mine {
            match (ticket.ticket.author.as_deref(), self.viewer_id.as_deref()) {
                (Some(author), Some(viewer)) if author == viewer => {}
                _ => return false,
            }
        }
        match self.company.as_deref() {
            Some(company) => ticket.company_id.as_deref() == Some(company),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketPage {
    pub items: Vec<EnrichedTicket>,
    /// Page actually shown after clamping, 1-based.
    pub page: usize,
    pub total_pages: usize,
    /// Ticket count after filtering.
    pub total: usize,
}

/// Filter, sort newest first (stable), and cut the requested page.
///
/// A page past the end clamps to the last page.
pub fn view(tickets: &[EnrichedTicket], filter: &FilterState) -> TicketPage {
    let mut filtered: Vec<&EnrichedTicket> = tickets.iter().filter(|t| filter.admits(t)).collect();
    filtered.sort_by(|a, b| b.ticket.created.cmp(&a.ticket.created));

    let total = filtered.len();
    let total_pages = total.div_ceil(PAGE_SIZE);
    let page = filter.page.clamp(1, total_pages.max(1));
    let items = filtered
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    TicketPage {
        items,
        page,
        total_pages,
        total,
    }
}
