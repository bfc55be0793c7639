pub mod auth;
pub mod projects;
pub mod tickets;
pub mod users;

use anyhow::{Context, Result};
use ticketdesk_client::{ClientConfig, FileSessionStore, Session, SessionManager, TicketingClient};
use ticketdesk_common::error::TicketdeskError;
use ticketdesk_config::AppConfig;

/// Shared state for one CLI invocation.
pub struct App {
    pub config: AppConfig,
    pub sessions: SessionManager<FileSessionStore>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = TicketingClient::new(ClientConfig::from(&config)).context("failed to build HTTP client")?;
        let store = FileSessionStore::new(&config.session_file);
        Ok(Self {
            sessions: SessionManager::new(client, store),
            config,
        })
    }

    /// The stored session, or an auth error when there is none.
    pub async fn session(&self) -> Result<Session> {
        match self.sessions.restore().await? {
            Some(session) => Ok(session),
            None => Err(TicketdeskError::Auth("not logged in".into()).into()),
        }
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("printer", 10), "printer");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Invité à la réunion", 8), "Invit...");
    }
}
