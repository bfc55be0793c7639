use async_trait::async_trait;
use ticketdesk_common::models::{Priority, Profile, Project, Ticket, TicketStatus, User};

use crate::error::ApiClientError;

/// One request against the paginated listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub status: TicketStatus,
    pub priority: Option<Priority>,
    pub company: Option<String>,
}

/// Read side of the gateway used by the crawl and the list loader.
#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn fetch_profile(&self) -> Result<Profile, ApiClientError>;

    /// Every project; admin sessions only.
    async fn fetch_projects(&self) -> Result<Vec<Project>, ApiClientError>;

    async fn fetch_projects_by_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<Project>, ApiClientError>;

    /// Every user; admin sessions only.
    async fn fetch_users(&self) -> Result<Vec<User>, ApiClientError>;

    /// `Ok(None)` when the page body carries no ticket list.
    async fn fetch_ticket_page(
        &self,
        request: &PageRequest,
    ) -> Result<Option<Vec<Ticket>>, ApiClientError>;
}
