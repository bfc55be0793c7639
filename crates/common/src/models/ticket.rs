use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Opened,
    Closed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    /// Statuses the listing endpoint can be queried with.
    pub const QUERYABLE: [TicketStatus; 2] = [TicketStatus::Opened, TicketStatus::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "opened" | "open" => Ok(Self::Opened),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("unknown ticket status: {value}")),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("unknown priority: {value}")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub user: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "de::lenient_timestamp")]
    pub created: Option<DateTime<Utc>>,
}

/// A ticket record as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "de::lenient_timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub project: Option<String>,
    /// Reporter email.
    #[serde(default, deserialize_with = "de::non_empty_string")]
    pub email: Option<String>,
    /// Raw attachment field: a JSON array, a JSON-encoded string, or nothing.
    #[serde(default)]
    pub files: Value,
    #[serde(default, deserialize_with = "de::lenient_vec")]
    pub comments: Vec<Comment>,
}

impl Ticket {
    /// Attachment filenames. A malformed `files` field yields no attachments.
    pub fn attachments(&self) -> Vec<String> {
        match &self.files {
            Value::Array(items) => names_from_array(items),
            Value::String(raw) if raw.trim().is_empty() => Vec::new(),
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Array(items)) => names_from_array(&items),
                Ok(_) => {
                    tracing::warn!(ticket_id = %self.id, "files field is not a list, ignoring");
                    Vec::new()
                }
                Err(e) => {
                    tracing::warn!(
                        ticket_id = %self.id,
                        error = %e,
                        "unparseable files field, treating as no attachments"
                    );
                    Vec::new()
                }
            },
            _ => Vec::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }
}

fn names_from_array(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ticket_with_files(files: Value) -> Ticket {
        serde_json::from_value(json!({ "id": "t1", "files": files })).unwrap()
    }

    #[test]
    fn deserialize_full_record() {
        let json = r#"{
            "id": "r8x2k",
            "title": "Printer on fire",
            "description": "Third floor",
            "status": "opened",
            "priority": "urgent",
            "created": "2024-05-02 09:00:00.000Z",
            "author": "u1",
            "assigned_to": "",
            "project": "p1",
            "email": "jane@atelier.ovh",
            "files": ["photo.png"],
            "comments": [{"user": "u2", "content": "on it"}]
        }"#;
        let ticket: Ticket = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(ticket.id, "r8x2k");
        assert_eq!(ticket.status, TicketStatus::Opened);
        assert_eq!(ticket.priority, Priority::Urgent);
        assert!(ticket.created.is_some());
        assert_eq!(ticket.assigned_to, None);
        assert_eq!(ticket.comments.len(), 1);
        assert_eq!(ticket.attachments(), vec!["photo.png"]);
    }

    #[test]
    fn deserialize_minimal_with_numeric_id() {
        let ticket: Ticket = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(ticket.id, "7");
        assert_eq!(ticket.status, TicketStatus::Unknown);
        assert!(ticket.created.is_none());
        assert!(ticket.comments.is_empty());
        assert!(ticket.attachments().is_empty());
    }

    #[test]
    fn unknown_status_and_priority_do_not_fail() {
        let ticket: Ticket =
            serde_json::from_str(r#"{"id": "a", "status": "archived", "priority": "p0"}"#).unwrap();
        assert_eq!(ticket.status, TicketStatus::Unknown);
        assert_eq!(ticket.priority, Priority::Unknown);
    }

    #[test]
    fn null_comments_are_empty() {
        let ticket: Ticket = serde_json::from_str(r#"{"id": "a", "comments": null}"#).unwrap();
        assert!(ticket.comments.is_empty());
    }

    #[test]
    fn json_encoded_files_string_is_parsed() {
        let ticket = ticket_with_files(json!(r#"["a.pdf","b.jpg"]"#));
        assert_eq!(ticket.attachments(), vec!["a.pdf", "b.jpg"]);
    }

    #[test]
    fn malformed_files_string_is_no_attachments() {
        let ticket = ticket_with_files(json!("{bad json"));
        assert!(ticket.attachments().is_empty());
    }

    #[test]
    fn non_list_files_are_ignored() {
        assert!(ticket_with_files(json!(r#"{"a": 1}"#)).attachments().is_empty());
        assert!(ticket_with_files(json!(42)).attachments().is_empty());
        assert!(ticket_with_files(json!("")).attachments().is_empty());
    }

    #[test]
    fn status_from_str() {
        assert_eq!("Closed".parse::<TicketStatus>().unwrap(), TicketStatus::Closed);
        assert_eq!("open".parse::<TicketStatus>().unwrap(), TicketStatus::Opened);
        assert!("pending".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn priority_from_str() {
        assert_eq!("URGENT".parse::<Priority>().unwrap(), Priority::Urgent);
        assert!("critical".parse::<Priority>().is_err());
    }
}
