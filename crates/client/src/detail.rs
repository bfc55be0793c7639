use reqwest::Url;
use ticketdesk_common::models::{Profile, Ticket};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    /// `None` when the files base URL cannot carry path segments.
    pub url: Option<String>,
    pub is_image: bool,
}

impl Attachment {
    fn new(files_url: &str, ticket_id: &str, name: String) -> Self {
        let url = attachment_url(files_url, ticket_id, &name);
        let is_image = is_image_name(&name);
        Self { name, url, is_image }
    }
}

fn attachment_url(files_url: &str, ticket_id: &str, name: &str) -> Option<String> {
    let mut url = Url::parse(files_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["tickets", ticket_id, name]);
    Some(url.into())
}

fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// One ticket as seen by a particular viewer.
#[derive(Debug, Clone)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub attachments: Vec<Attachment>,
    pub is_creator: bool,
    pub can_assign: bool,
    pub can_close: bool,
    pub can_delete: bool,
}

impl TicketDetail {
    pub fn new(ticket: Ticket, viewer: &Profile, files_url: &str) -> Self {
        let attachments = ticket
            .attachments()
            .into_iter()
            .map(|name| Attachment::new(files_url, &ticket.id, name))
            .collect();

        let is_creator = ticket.author.as_deref() == Some(viewer.id.as_str());
        let closed = ticket.is_closed();

        Self {
            attachments,
            is_creator,
            can_assign: viewer.admin && !closed,
            can_close: (viewer.admin || is_creator) && !closed,
            can_delete: viewer.admin,
            ticket,
        }
    }
}
