use anyhow::Result;
use ticketdesk_client::forms::Registration;
use ticketdesk_client::Session;

use super::App;

fn greet(session: &Session) {
    let name = session
        .profile()
        .name
        .as_deref()
        .or(session.profile().email.as_deref())
        .unwrap_or(session.user_id());
    println!("Logged in as {}", name);
}

pub async fn login(app: &App, identity: &str, password: &str) -> Result<()> {
    let session = app.sessions.login(identity, password).await?;
    greet(&session);
    Ok(())
}

pub async fn login_google(app: &App, access_token: &str) -> Result<()> {
    let session = app.sessions.login_with_google(access_token).await?;
    greet(&session);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.sessions.logout().await?;
    println!("Logged out.");
    Ok(())
}

pub async fn register(app: &App, registration: Registration) -> Result<()> {
    let username = registration.username.clone();
    match app.sessions.register(registration).await? {
        Some(user) => println!("Created account {} ({})", username, user.id),
        None => println!("Created account {}", username),
    }
    println!("Run `ticketdesk login` to sign in.");
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let session = app.session().await?;
    let profile = session.profile();

    println!("ID:      {}", profile.id);
    if let Some(name) = &profile.name {
        println!("Name:    {}", name);
    }
    if let Some(email) = &profile.email {
        println!("Email:   {}", email);
    }
    if let Some(company) = &profile.company {
        println!("Company: {} ({})", company.name, company.id);
    }
    println!("Role:    {}", if profile.admin { "admin" } else { "member" });
    Ok(())
}
