pub mod de;
pub mod profile;
pub mod project;
pub mod ticket;

pub use profile::{CompanyRef, Profile, User};
pub use project::Project;
pub use ticket::{Comment, Priority, Ticket, TicketStatus};
