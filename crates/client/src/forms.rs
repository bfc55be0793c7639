//! Local form validation. Anything rejected here never reaches the network.

use ticketdesk_common::error::{TicketdeskError, TicketdeskResult};
use ticketdesk_common::models::Priority;

use crate::requests::RegisterRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub project: Option<String>,
    pub attachments: Vec<AttachmentUpload>,
}

/// A ticket form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTicket {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) priority: Priority,
    pub(crate) project: String,
    pub(crate) attachments: Vec<AttachmentUpload>,
}

impl ValidTicket {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn attachment_names(&self) -> Vec<&str> {
        self.attachments.iter().map(|a| a.file_name.as_str()).collect()
    }
}

impl NewTicket {
    pub fn validate(self) -> TicketdeskResult<ValidTicket> {
        let title = required(&self.title, "title")?;
        let description = required(&self.description, "description")?;
        let priority = match self.priority {
            Some(Priority::Unknown) | None => {
                return Err(TicketdeskError::Validation("priority is required".into()))
            }
            Some(p) => p,
        };
        let project = self
            .project
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| TicketdeskError::Validation("a project must be chosen".into()))?
            .to_owned();
        let attachments = self
            .attachments
            .into_iter()
            .map(|a| AttachmentUpload {
                file_name: sanitize_file_name(&a.file_name),
                ..a
            })
            .collect();

        Ok(ValidTicket {
            title,
            description,
            priority,
            project,
            attachments,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub ticket_id: String,
    pub content: String,
}

impl NewComment {
    pub fn validate(self) -> TicketdeskResult<Self> {
        Ok(Self {
            ticket_id: required(&self.ticket_id, "ticket id")?,
            content: required(&self.content, "comment")?,
        })
    }
}

/// Assignee ids are trimmed and must not be blank.
pub fn validate_assignee(user_id: &str) -> TicketdeskResult<String> {
    required(user_id, "user id")
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub username: String,
    pub password: String,
    pub company_id: Option<String>,
}

impl Registration {
    pub fn validate(self) -> TicketdeskResult<RegisterRequest> {
        let email = required(&self.email, "email")?;
        if !email.contains('@') {
            return Err(TicketdeskError::Validation(format!("'{email}' is not an email address")));
        }
        if self.password.trim().is_empty() {
            return Err(TicketdeskError::Validation("password is required".into()));
        }
        Ok(RegisterRequest {
            email,
            name: required(&self.name, "name")?,
            username: required(&self.username, "username")?,
            password: self.password,
            company_id: self
                .company_id
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty()),
        })
    }
}

fn required(value: &str, field: &str) -> TicketdeskResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TicketdeskError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

/// Lowercase, collapse whitespace runs to `_`, keep only `[A-Za-z0-9_.-]`.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
            out.push(c);
        }
    }
    if out.trim_matches('.').is_empty() {
        return "attachment".to_owned();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewTicket {
        NewTicket {
            title: " Broken VPN ".into(),
            description: "Cannot connect".into(),
            priority: Some(Priority::High),
            project: Some("p1".into()),
            attachments: vec![AttachmentUpload {
                file_name: "Screen Shot (1).PNG".into(),
                mime_type: "image/png".into(),
                bytes: vec![1, 2, 3],
            }],
        }
    }

    #[test]
    fn valid_form_is_trimmed_and_sanitized() {
        let valid = form().validate().unwrap();
        assert_eq!(valid.title(), "Broken VPN");
        assert_eq!(valid.attachment_names(), vec!["screen_shot_1.png"]);
    }

    #[test]
    fn missing_fields_are_rejected() {
        let mut f = form();
        f.title = "   ".into();
        assert!(matches!(f.validate(), Err(TicketdeskError::Validation(_))));

        let mut f = form();
        f.priority = None;
        assert!(f.validate().unwrap_err().to_string().contains("priority"));

        let mut f = form();
        f.project = Some(" ".into());
        assert!(f.validate().unwrap_err().to_string().contains("project"));
    }

    #[test]
    fn sanitize_file_names() {
        assert_eq!(sanitize_file_name("Rapport Final  v2.pdf"), "rapport_final_v2.pdf");
        assert_eq!(sanitize_file_name("été.jpg"), "t.jpg");
        assert_eq!(sanitize_file_name("???"), "attachment");
    }

    #[test]
    fn blank_comment_is_rejected() {
        let comment = NewComment {
            ticket_id: "t1".into(),
            content: "  \n".into(),
        };
        assert!(matches!(comment.validate(), Err(TicketdeskError::Validation(_))));
    }

    #[test]
    fn assignee_is_trimmed() {
        assert_eq!(validate_assignee("  u42 ").unwrap(), "u42");
        assert!(validate_assignee("").is_err());
    }

    #[test]
    fn registration_requires_email_shape() {
        let reg = Registration {
            email: "nobody".into(),
            name: "N".into(),
            username: "n".into(),
            password: "pw".into(),
            company_id: Some("  ".into()),
        };
        assert!(reg.validate().is_err());

        let reg = Registration {
            email: "n@atelier.ovh".into(),
            name: "N".into(),
            username: "n".into(),
            password: "pw".into(),
            company_id: Some("  ".into()),
        };
        let req = reg.validate().unwrap();
        assert!(req.company_id.is_none());
    }
}
