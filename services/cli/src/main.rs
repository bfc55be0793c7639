mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ticketdesk_common::error::TicketdeskError;
use ticketdesk_common::models::{Priority, TicketStatus};
use ticketdesk_config::{init_tracing, AppConfig};

use commands::App;

#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(about = "Command-line client for the ticketing gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an email or username
    Login {
        /// Email or username
        identity: String,
        /// Password
        #[arg(long, env = "TICKETDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in with a Google OAuth access token
    LoginGoogle {
        /// OAuth access token
        access_token: String,
    },

    /// Log out and forget the stored session
    Logout,

    /// Create an account
    Register {
        email: String,
        name: String,
        username: String,
        #[arg(long, env = "TICKETDESK_PASSWORD", hide_env_values = true)]
        password: String,
        /// Company id to join
        #[arg(long)]
        company: Option<String>,
    },

    /// Show the signed-in profile
    Whoami,

    /// List tickets
    List {
        /// Filter by status (opened, closed)
        #[arg(short, long)]
        status: Option<TicketStatus>,
        /// Filter by priority (low, medium, high, urgent)
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Filter by company id or name
        #[arg(short, long)]
        company: Option<String>,
        /// Only tickets I created
        #[arg(short, long)]
        mine: bool,
        /// Page number, 1-based
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show ticket details
    Show {
        /// Ticket ID
        id: String,
    },

    /// Open a new ticket
    Create {
        /// Ticket title
        title: String,
        /// Ticket description
        #[arg(short, long)]
        description: String,
        /// Priority (low, medium, high, urgent)
        #[arg(short, long)]
        priority: Priority,
        /// Project ID or name (defaults to the first available project)
        #[arg(long)]
        project: Option<String>,
        /// Files to attach
        #[arg(short, long = "attach")]
        attach: Vec<PathBuf>,
    },

    /// List the projects you can file tickets in
    Projects,

    /// Assign a ticket to a user (admins)
    Assign {
        /// Ticket ID
        id: String,
        /// User ID
        user_id: String,
    },

    /// Close a ticket
    Close {
        /// Ticket ID
        id: String,
    },

    /// Delete a ticket (admins)
    Delete {
        /// Ticket ID
        id: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Comment on a ticket
    Comment {
        /// Ticket ID
        id: String,
        /// Comment text
        text: String,
    },

    /// List users (admins)
    Users,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    init_tracing(&config.log_level);

    let app = App::new(config)?;
    let result = run(&app, cli.command).await;

    if let Err(err) = &result {
        if err
            .downcast_ref::<TicketdeskError>()
            .is_some_and(TicketdeskError::is_auth)
        {
            if let Err(e) = app.sessions.invalidate().await {
                tracing::warn!(error = %e, "failed to clear session");
            }
            eprintln!("Not signed in. Run `ticketdesk login` to sign in again.");
        }
    }
    result
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Login { identity, password } => commands::auth::login(app, &identity, &password).await,
        Commands::LoginGoogle { access_token } => commands::auth::login_google(app, &access_token).await,
        Commands::Logout => commands::auth::logout(app).await,
        Commands::Register {
            email,
            name,
            username,
            password,
            company,
        } => {
            commands::auth::register(
                app,
                ticketdesk_client::forms::Registration {
                    email,
                    name,
                    username,
                    password,
                    company_id: company,
                },
            )
            .await
        }
        Commands::Whoami => commands::auth::whoami(app).await,
        Commands::List {
            status,
            priority,
            company,
            mine,
            page,
        } => {
            let args = commands::tickets::ListArgs {
                status,
                priority,
                company,
                mine,
                page,
            };
            commands::tickets::list(app, args).await
        }
        Commands::Show { id } => commands::tickets::show(app, &id).await,
        Commands::Create {
            title,
            description,
            priority,
            project,
            attach,
        } => {
            commands::tickets::create(
                app,
                &title,
                &description,
                priority,
                project.as_deref(),
                &attach,
            )
            .await
        }
        Commands::Projects => commands::projects::list(app).await,
        Commands::Assign { id, user_id } => commands::tickets::assign(app, &id, &user_id).await,
        Commands::Close { id } => commands::tickets::close(app, &id).await,
        Commands::Delete { id, yes } => commands::tickets::delete(app, &id, yes).await,
        Commands::Comment { id, text } => commands::tickets::comment(app, &id, &text).await,
        Commands::Users => commands::users::list(app).await,
    }
}
