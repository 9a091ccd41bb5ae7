use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use console_core::observability::init_tracing;
use dotenvy::dotenv;
use hr_console::Console;
use hr_console::config::get_configuration;
use hr_console::models::ProfileUpdate;
use hr_console::services::{Resource, TerminalNavigator};
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;

/// hr-console - HR administration console client
#[derive(Parser, Debug)]
#[command(name = "hr-console")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Override the API base URL (e.g. http://localhost:5007/api)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and persist the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "HR_CONSOLE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and clear the persisted session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Change the account password
    ChangePassword {
        #[arg(long, env = "HR_CONSOLE_CURRENT_PASSWORD", hide_env_values = true)]
        current: String,

        #[arg(long, env = "HR_CONSOLE_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },

    /// Show or edit the linked employee profile
    Profile {
        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// Fetch a resource, e.g. `get employees` or `get payrolls 42`
    Get {
        resource: Resource,

        id: Option<i64>,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = parse_key_val)]
        query: Vec<(String, String)>,
    },
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow!("Configuration error: {}", e)
    })?;
    if let Some(base_url) = cli.base_url {
        configuration.api.base_url = base_url;
    }

    init_tracing(
        "hr-console",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    let console = Console::from_settings(&configuration, Arc::new(TerminalNavigator))
        .context("Failed to initialize console")?;

    match cli.command {
        Commands::Login { username, password } => {
            console
                .auth
                .login(&username, &Secret::new(password))
                .await?;
            let session = console.auth.session();
            if let Some(user) = session.user {
                println!(
                    "Logged in as {} ({})",
                    user.display_name(),
                    user.role.as_str()
                );
            }
        }
        Commands::Logout => {
            console.auth.logout().await;
            println!("Logged out");
        }
        Commands::Whoami => {
            let Some(reconcile) = console.auth.initialize_auth() else {
                return Err(anyhow!("Not logged in"));
            };

            match reconcile.await.context("Profile refresh task failed")? {
                Ok(current) => print_json(&serde_json::to_value(&current)?)?,
                Err(e) => {
                    // Still signed in on the strength of the token; say so.
                    let session = console.auth.session();
                    let user = session.user.ok_or_else(|| anyhow!(e.message.clone()))?;
                    eprintln!("Could not refresh profile: {}", e);
                    print_json(&serde_json::to_value(&user)?)?;
                }
            }
        }
        Commands::ChangePassword { current, new } => {
            console
                .auth
                .change_password(&Secret::new(current), &Secret::new(new))
                .await?;
            println!("Password changed");
        }
        Commands::Profile { phone, address } => {
            let update = ProfileUpdate { phone, address };
            if update.is_empty() {
                print_json(&console.auth.profile().await?)?;
            } else {
                let outcome = console.auth.update_profile(&update).await?;
                println!("{}", outcome.message);
                for field in outcome.updated_fields {
                    println!("  {}", field);
                }
            }
        }
        Commands::Get {
            resource,
            id,
            query,
        } => {
            let session = console.auth.session();
            if resource.admin_only()
                && let Some(user) = session.user.as_ref()
                && !user.is_admin()
            {
                tracing::warn!(resource = %resource, "Resource is restricted to administrators");
            }

            let value = match id {
                Some(id) => console.hr.get(resource, id).await?,
                None => console.hr.list(resource, &query).await?,
            };
            print_json(&value)?;
        }
    }

    Ok(())
}
