//! Pure ticket enrichment: company resolution, filtering, sorting and
//! pagination over already-fetched gateway data. Nothing here does I/O.

pub mod config;
pub mod directory;
pub mod engine;
pub mod guess;
pub mod view;

pub use config::EnrichmentConfig;
pub use directory::{CompanyDirectory, CompanyOption};
pub use engine::{enrich, EnrichedTicket};
pub use guess::{CompanyGuesser, DomainRule, KnownDomains};
pub use view::{view, FilterState, TicketPage, PAGE_SIZE};
