use clap::Subcommand;
use serde_json::json;

use crate::cli::config::open_store;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::page::{AccessPolicy, LoginSession};

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Persist a login session")]
    Login {
        #[arg(help = "User id")]
        user_id: String,
        #[arg(long, help = "Display name (defaults to the user id)")]
        name: Option<String>,
        #[arg(long, help = "Role code, e.g. AD")]
        role: String,
        #[arg(long, help = "Email address")]
        email: Option<String>,
    },

    #[command(about = "Show the persisted session")]
    Show,

    #[command(about = "Remove the persisted session")]
    Logout,
}

pub async fn handle(cmd: SessionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store()?;

    match cmd {
        SessionCommands::Login { user_id, name, role, email } => {
            let mut session = LoginSession::new(user_id.clone(), name.unwrap_or_else(|| user_id.clone()), role);
            if let Some(email) = email {
                session.email = email;
            }
            session.save(&store).await?;

            let admin = AccessPolicy::from_config().allows(&session);
            output_success(
                &output_format,
                &format!("Logged in as {} (admin screens: {})", user_id, if admin { "yes" } else { "no" }),
                Some(json!({ "session": session, "admin": admin })),
            )
        }
        SessionCommands::Show => match LoginSession::load(&store).await? {
            Some(session) => match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "session": session }))?);
                    Ok(())
                }
                OutputFormat::Text => {
                    println!("User: {} ({})", session.name, session.user_id);
                    println!("Role: {}", session.role);
                    if !session.email.is_empty() {
                        println!("Email: {}", session.email);
                    }
                    println!("Logged in: {}", session.logged_in_at);
                    Ok(())
                }
            },
            None => output_success(&output_format, "No session", Some(json!({ "session": null }))),
        },
        SessionCommands::Logout => {
            LoginSession::clear(&store).await?;
            output_success(&output_format, "Logged out", None)
        }
    }
}
