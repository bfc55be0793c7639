use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use ticketdesk_common::error::{TicketdeskError, TicketdeskResult};

const DEFAULT_API_URL: &str = "https://ticketing.development.atelier.ovh/api/mobile";
const DEFAULT_FILES_URL: &str = "https://ticketing.development.atelier.ovh/api/files";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api_url: String,
    pub files_url: String,
    pub session_file: PathBuf,
    pub page_limit: u32,
    pub max_pages: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present; every variable has a default.
    pub fn from_env() -> TicketdeskResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_url: trim_base(get_var_or("TICKETDESK_API_URL", DEFAULT_API_URL)),
            files_url: trim_base(get_var_or("TICKETDESK_FILES_URL", DEFAULT_FILES_URL)),
            session_file: env::var("TICKETDESK_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_session_file()),
            page_limit: get_positive("TICKETDESK_PAGE_LIMIT", 20)?,
            max_pages: get_positive("TICKETDESK_MAX_PAGES", 10)?,
            timeout_secs: get_positive("TICKETDESK_TIMEOUT_SECS", 30)?,
            max_retries: get_max_retries()?,
            log_level: get_var_or("LOG_LEVEL", "warn"),
        })
    }
}

fn default_session_file() -> PathBuf {
    match env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home).join(".ticketdesk").join("session.json"),
        _ => PathBuf::from(".ticketdesk-session.json"),
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_owned()
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Upper bound for `TICKETDESK_MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

fn get_max_retries() -> TicketdeskResult<u32> {
    let retries: u32 = get_var_or("TICKETDESK_MAX_RETRIES", "3")
        .trim()
        .parse()
        .map_err(|e| TicketdeskError::Config(format!("invalid TICKETDESK_MAX_RETRIES: {e}")))?;
    if retries > MAX_RETRIES_LIMIT {
        return Err(TicketdeskError::Config(format!(
            "TICKETDESK_MAX_RETRIES must be at most {MAX_RETRIES_LIMIT}"
        )));
    }
    Ok(retries)
}

fn get_positive<T>(key: &str, default: T) -> TicketdeskResult<T>
where
    T: std::str::FromStr + PartialOrd + Default + Copy,
    T::Err: std::fmt::Display,
{
    let value = match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| TicketdeskError::Config(format!("invalid {key}: {e}")))?,
        Err(_) => default,
    };
    if value <= T::default() {
        return Err(TicketdeskError::Config(format!("{key} must be greater than zero")));
    }
    Ok(value)
}
