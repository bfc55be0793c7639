use serde::Deserialize;
use serde_json::Value;
use ticketdesk_common::models::de;
use ticketdesk_common::models::{Profile, Project, Ticket, User};

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectsEnvelope {
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
pub struct UsersEnvelope {
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct TicketEnvelope {
    #[serde(default)]
    pub ticket: Option<Ticket>,
}

/// One page of `GET /tickets`.
#[derive(Debug, Deserialize)]
pub struct TicketsEnvelope {
    #[serde(default)]
    pub tickets: Value,
}

impl TicketsEnvelope {
    /// `None` when `tickets` is missing or not a list. Records that fail to
    /// decode are skipped.
    pub fn into_page(self) -> Option<Vec<Ticket>> {
        let Value::Array(items) = self.tickets else {
            return None;
        };
        Some(
            items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<Ticket>(item) {
                    Ok(ticket) => Some(ticket),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping undecodable ticket record");
                        None
                    }
                })
                .collect(),
        )
    }
}
