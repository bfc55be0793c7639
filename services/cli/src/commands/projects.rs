use anyhow::Result;
use ticketdesk_client::project_choices;
use ticketdesk_common::error::TicketdeskError;

use super::{truncate, App};

pub async fn list(app: &App) -> Result<()> {
    let session = app.session().await?;
    let choices = project_choices(session.client(), session.profile())
        .await
        .map_err(TicketdeskError::from)?;

    if choices.is_empty() {
        println!("No projects available.");
        return Ok(());
    }

    for (i, choice) in choices.iter().enumerate() {
        let marker = match (choice.forced, i) {
            (true, _) => "(required)",
            (false, 0) => "(default)",
            _ => "",
        };
        println!("{:<16} {:<40} {}", choice.id, truncate(&choice.name, 40), marker);
    }

    Ok(())
}
