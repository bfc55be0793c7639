pub mod api;
pub mod client;
pub mod crawl;
pub mod detail;
pub mod error;
pub mod forms;
pub mod loader;
pub mod projects;
pub mod requests;
pub mod responses;
pub mod session;

pub use api::{PageRequest, TicketApi};
pub use client::{ClientConfig, TicketingClient};
pub use crawl::{fetch_all_tickets, CrawlFailure, CrawlLimits, CrawlOutcome, TicketQuery};
pub use detail::{Attachment, TicketDetail};
pub use error::ApiClientError;
pub use loader::{LoadOutcome, LoaderSettings, TicketListLoader, TicketSnapshot};
pub use projects::{project_choices, select_project, ProjectChoice};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionManager, SessionStore};
