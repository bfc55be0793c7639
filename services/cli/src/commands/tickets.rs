use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ticketdesk_client::forms::{validate_assignee, AttachmentUpload, NewComment, NewTicket};
use ticketdesk_client::{
    project_choices, select_project, CrawlLimits, LoaderSettings, Session, TicketDetail,
    TicketListLoader,
};
use ticketdesk_common::error::TicketdeskError;
use ticketdesk_common::models::{Priority, TicketStatus};
use ticketdesk_enrichment::CompanyOption;

use super::{truncate, App};

pub struct ListArgs {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub company: Option<String>,
    pub mine: bool,
    pub page: usize,
}

pub async fn list(app: &App, args: ListArgs) -> Result<()> {
    let session = app.session().await?;
    let settings = LoaderSettings {
        limits: CrawlLimits::from(&app.config),
        ..LoaderSettings::default()
    };
    let loader = TicketListLoader::new(Arc::new(session.client().clone()), settings);

    loader
        .update_filter(|f| {
            f.set_status(args.status);
            f.set_priority(args.priority);
        })
        .await;
    loader.refresh().await?;

    let Some(snapshot) = loader.snapshot().await else {
        return Ok(());
    };
    for failure in &snapshot.failures {
        eprintln!(
            "warning: {} tickets stopped at page {}: {}",
            failure.status, failure.page, failure.error
        );
    }

    let company = match args.company.as_deref() {
        Some(wanted) => Some(resolve_company(&snapshot.companies, wanted)?),
        None => None,
    };
    loader
        .update_filter(|f| {
            f.set_company(company);
            f.set_only_mine(args.mine);
            f.set_page(args.page);
        })
        .await;

    let Some(page) = loader.current_page().await else {
        return Ok(());
    };
    if page.items.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    for item in &page.items {
        let date = item
            .ticket
            .created
            .map(|c| c.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:8} {:8} {:<40} {:<20} {}",
            item.ticket.id,
            format!("[{}]", item.ticket.status),
            item.ticket.priority,
            truncate(&item.ticket.title, 40),
            truncate(&item.company_name, 20),
            date
        );
    }
    println!(
        "Page {}/{} ({} tickets)",
        page.page, page.total_pages, page.total
    );

    Ok(())
}

fn resolve_company(options: &[CompanyOption], wanted: &str) -> Result<String> {
    let wanted = wanted.trim();
    options
        .iter()
        .find(|o| o.id == wanted || o.name.eq_ignore_ascii_case(wanted))
        .map(|o| o.id.clone())
        .with_context(|| format!("Unknown company '{}'", wanted))
}

async fn load_detail(app: &App, session: &Session, id: &str) -> Result<TicketDetail> {
    let ticket = session
        .client()
        .fetch_ticket(id)
        .await
        .map_err(TicketdeskError::from)?;
    Ok(TicketDetail::new(ticket, session.profile(), &app.config.files_url))
}

pub async fn show(app: &App, id: &str) -> Result<()> {
    let session = app.session().await?;
    let detail = load_detail(app, &session, id).await?;
    let ticket = &detail.ticket;

    println!("Ticket {}: {}", ticket.id, ticket.title);
    println!("Status:    {}", ticket.status);
    println!("Priority:  {}", ticket.priority);
    if let Some(created) = ticket.created {
        println!("Created:   {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(author) = &ticket.author {
        let you = if detail.is_creator { " (you)" } else { "" };
        println!("Author:    {}{}", author, you);
    }
    if let Some(assignee) = &ticket.assigned_to {
        println!("Assigned:  {}", assignee_label(&session, assignee).await);
    }
    if let Some(project) = &ticket.project {
        println!("Project:   {}", project);
    }

    if !ticket.description.is_empty() {
        println!("\n{}", ticket.description);
    }

    if !detail.attachments.is_empty() {
        println!("\nAttachments:");
        for attachment in &detail.attachments {
            let kind = if attachment.is_image { "image" } else { "file" };
            match &attachment.url {
                Some(url) => println!("  [{}] {} {}", kind, attachment.name, url),
                None => println!("  [{}] {}", kind, attachment.name),
            }
        }
    }

    if !ticket.comments.is_empty() {
        println!("\nComments:");
        for comment in &ticket.comments {
            let when = comment
                .created
                .map(|c| c.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!(
                "  [{}] {}: {}",
                when,
                comment.user.as_deref().unwrap_or("unknown"),
                comment.content
            );
        }
    }

    let mut actions = Vec::new();
    if detail.can_close {
        actions.push("close");
    }
    if detail.can_assign {
        actions.push("assign");
    }
    if detail.can_delete {
        actions.push("delete");
    }
    if !actions.is_empty() {
        println!("\nAvailable: {}", actions.join(", "));
    }

    Ok(())
}

/// `name (id)` when the user lookup is allowed and succeeds, else the bare id.
async fn assignee_label(session: &Session, user_id: &str) -> String {
    if !session.is_admin() {
        return user_id.to_string();
    }
    match session.client().fetch_user(user_id).await {
        Ok(user) => match user.name.or(user.username) {
            Some(name) => format!("{} ({})", name, user_id),
            None => user_id.to_string(),
        },
        Err(e) => {
            tracing::debug!(user_id, error = %e, "assignee lookup failed");
            user_id.to_string()
        }
    }
}

pub async fn create(
    app: &App,
    title: &str,
    description: &str,
    priority: Priority,
    project: Option<&str>,
    attach: &[PathBuf],
) -> Result<()> {
    let mut attachments = Vec::with_capacity(attach.len());
    for path in attach {
        attachments.push(read_attachment(path).await?);
    }

    let session = app.session().await?;
    let choices = project_choices(session.client(), session.profile())
        .await
        .map_err(TicketdeskError::from)?;
    let project = select_project(&choices, project)?;

    let form = NewTicket {
        title: title.to_string(),
        description: description.to_string(),
        priority: Some(priority),
        project: Some(project),
        attachments,
    }
    .validate()?;

    let ticket = session
        .client()
        .create_ticket(&form)
        .await
        .map_err(TicketdeskError::from)?;

    println!("Created ticket {} in project {}", ticket.id, form.project());
    Ok(())
}

async fn read_attachment(path: &Path) -> Result<AttachmentUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(AttachmentUpload {
        mime_type: mime_for(&file_name).to_string(),
        file_name,
        bytes,
    })
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" | "log" => "text/plain",
        _ => "application/octet-stream",
    }
}

pub async fn assign(app: &App, id: &str, user_id: &str) -> Result<()> {
    let user_id = validate_assignee(user_id)?;
    let session = app.session().await?;
    let detail = load_detail(app, &session, id).await?;
    if !detail.can_assign {
        bail!("Ticket {} cannot be assigned by you", id);
    }

    session
        .client()
        .assign_ticket(id, &user_id)
        .await
        .map_err(TicketdeskError::from)?;
    println!("Assigned ticket {} to {}", id, user_id);
    Ok(())
}

pub async fn close(app: &App, id: &str) -> Result<()> {
    let session = app.session().await?;
    let detail = load_detail(app, &session, id).await?;
    if detail.ticket.is_closed() {
        println!("Ticket {} is already closed", id);
        return Ok(());
    }
    if !detail.can_close {
        bail!("Ticket {} can only be closed by its author or an administrator", id);
    }

    session
        .client()
        .close_ticket(id)
        .await
        .map_err(TicketdeskError::from)?;
    println!("Closed ticket {}", id);
    Ok(())
}

pub async fn delete(app: &App, id: &str, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete ticket {} without --yes", id);
    }

    let session = app.session().await?;
    if !session.is_admin() {
        bail!("Only administrators can delete tickets");
    }

    session
        .client()
        .delete_ticket(id)
        .await
        .map_err(TicketdeskError::from)?;
    println!("Deleted ticket {}", id);
    Ok(())
}

pub async fn comment(app: &App, id: &str, text: &str) -> Result<()> {
    let comment = NewComment {
        ticket_id: id.to_string(),
        content: text.to_string(),
    }
    .validate()?;

    let session = app.session().await?;
    session
        .client()
        .post_comment(&comment)
        .await
        .map_err(TicketdeskError::from)?;
    println!("Added comment to ticket {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<CompanyOption> {
        vec![
            CompanyOption {
                id: "nls628xs4p24rej".into(),
                name: "Atelier".into(),
            },
            CompanyOption {
                id: "c2".into(),
                name: "Testing Inc".into(),
            },
        ]
    }

    #[test]
    fn resolves_company_by_id_or_name() {
        assert_eq!(resolve_company(&options(), "c2").unwrap(), "c2");
        assert_eq!(resolve_company(&options(), "atelier").unwrap(), "nls628xs4p24rej");
        assert!(resolve_company(&options(), "Nowhere").is_err());
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(mime_for("shot.PNG"), "image/png");
        assert_eq!(mime_for("report.pdf"), "application/pdf");
        assert_eq!(mime_for("blob"), "application/octet-stream");
    }
}
