use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::{resolve_api_url, ApiClient};
use crate::cli::session::Session;
use crate::cli::utils::{output_success, output_value, plain};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the panel API")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
        #[arg(long, help = "API base URL to remember for later commands")]
        url: Option<String>,
    },

    #[command(about = "Register a new account")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
        #[arg(long, help = "Role (school_admin or super_admin)")]
        role: Option<String>,
        #[arg(long, help = "API base URL to remember for later commands")]
        url: Option<String>,
    },

    #[command(about = "Create your school and finish onboarding")]
    Onboard {
        #[arg(long, help = "School name")]
        school_name: String,
        #[arg(long, help = "Board (CBSE, ICSE, ...)")]
        board: String,
        #[arg(long, help = "Administrator name")]
        admin_name: String,
        #[arg(long, help = "Administrator email")]
        admin_email: String,
        #[arg(long, help = "Administrator phone")]
        admin_phone: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    #[command(about = "Logout and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Refresh authentication token")]
    Refresh,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = Session::load()?;

    match cmd {
        AuthCommands::Login { email, password, url } => {
            if url.is_some() {
                session.api_url = url;
            }
            let client = ApiClient::new(resolve_api_url(&session), None);
            let response = client
                .post("/auth/login", json!({ "email": email, "password": password }))
                .await?;
            remember(&mut session, &client, &response)?;

            output_success(
                &output_format,
                &format!("Logged in as {}", email),
                Some(json!({ "user": response["user"] })),
            )
        }
        AuthCommands::Register { name, email, password, role, url } => {
            if url.is_some() {
                session.api_url = url;
            }
            let client = ApiClient::new(resolve_api_url(&session), None);
            let mut body = json!({ "name": name, "email": email, "password": password });
            if let Some(role) = role {
                body["role"] = json!(role);
            }
            let response = client.post("/auth/register", body).await?;
            remember(&mut session, &client, &response)?;

            output_success(
                &output_format,
                &format!("Registered {}", email),
                Some(json!({ "user": response["user"] })),
            )
        }
        AuthCommands::Onboard {
            school_name,
            board,
            admin_name,
            admin_email,
            admin_phone,
            address,
            website,
            description,
        } => {
            let client = ApiClient::from_session(&session);
            let body = json!({
                "schoolName": school_name,
                "board": board,
                "adminName": admin_name,
                "adminEmail": admin_email,
                "adminPhone": admin_phone,
                "schoolAddress": address,
                "website": website,
                "description": description,
            });
            let response = client.post("/auth/onboarding", body).await?;
            remember(&mut session, &client, &response)?;

            output_success(
                &output_format,
                &format!("Onboarded school {}", plain(&response["school"]["name"])),
                Some(json!({ "school": response["school"] })),
            )
        }
        AuthCommands::Logout => {
            if session.is_authenticated() {
                let client = ApiClient::from_session(&session);
                if let Err(e) = client.post("/auth/logout", json!({})).await {
                    tracing::debug!("logout request failed: {}", e);
                }
            }
            session.clear();
            session.save()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let client = ApiClient::from_session(&session);
            let reachable = client.ping().await;
            let status = json!({
                "apiUrl": client.base_url(),
                "reachable": reachable,
                "authenticated": session.is_authenticated(),
                "user": session.user,
            });

            match output_format {
                OutputFormat::Json => output_value(&output_format, &status),
                OutputFormat::Text => {
                    println!("API: {} ({})", client.base_url(), if reachable { "up" } else { "down" });
                    match &session.user {
                        Some(user) if session.is_authenticated() => println!(
                            "Logged in as {} ({})",
                            plain(&user["email"]),
                            plain(&user["role"])
                        ),
                        _ => println!("Not logged in"),
                    }
                    Ok(())
                }
            }
        }
        AuthCommands::Refresh => {
            let client = ApiClient::from_session(&session);
            let response = client.post("/auth/refresh", json!({})).await?;
            let token = response["token"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("Refresh response carried no token"))?;
            session.token = Some(token.to_string());
            session.save()?;
            output_success(&output_format, "Token refreshed", None)
        }
        AuthCommands::Whoami => {
            let client = ApiClient::from_session(&session);
            let user = client.get("/auth/me").await?;
            session.user = Some(user.clone());
            session.save()?;
            output_value(&output_format, &user)
        }
    }
}

/// Stores the token and user from a `{token, user}` response.
fn remember(session: &mut Session, client: &ApiClient, response: &Value) -> anyhow::Result<()> {
    let token = response["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Response carried no token"))?;
    session.api_url = Some(client.base_url().to_string());
    session.token = Some(token.to_string());
    session.user = response.get("user").cloned();
    session.save()
}
