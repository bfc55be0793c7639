use anyhow::{bail, Result};
use ticketdesk_common::error::TicketdeskError;
use ticketdesk_enrichment::{CompanyDirectory, EnrichmentConfig, KnownDomains};

use super::{truncate, App};

pub async fn list(app: &App) -> Result<()> {
    let session = app.session().await?;
    if !session.is_admin() {
        bail!("The user list is only available to administrators.");
    }

    let users = session
        .client()
        .fetch_users()
        .await
        .map_err(TicketdeskError::from)?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    let mut directory = CompanyDirectory::with_known(&EnrichmentConfig::default());
    directory.observe_users(&users, &KnownDomains::default());

    for user in &users {
        let display = user
            .name
            .as_deref()
            .or(user.username.as_deref())
            .unwrap_or("-");
        let company = user
            .company
            .as_deref()
            .and_then(|id| directory.get(id))
            .unwrap_or("-");
        println!(
            "{:<16} {:<24} {:<32} {:<20} {}",
            user.id,
            truncate(display, 24),
            truncate(user.email.as_deref().unwrap_or("-"), 32),
            truncate(company, 20),
            if user.admin { "admin" } else { "" }
        );
    }

    Ok(())
}
