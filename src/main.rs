// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! equipdash command-line front end
//!
//! Logs in to the equipment analytics backend, uploads CSV files and shows
//! the server-computed summaries and upload history.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use equipdash::{
    config::Config,
    models::{LoginRequest, SignupRequest, UploadRecord},
    services::{AuthService, UploadService},
    store::FileCredentialStore,
    ApiClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "equipdash", version, about = "Equipment usage analytics client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and save the session
    Login(LoginArgs),
    /// Create an account and save the session
    Signup(SignupArgs),
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Upload a CSV file and print its summary
    Upload {
        /// Path to the CSV file
        path: PathBuf,
    },
    /// List previous uploads
    History {
        #[arg(long, default_value_t = 5)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

#[derive(Debug, Args)]
struct LoginArgs {
    #[arg(short, long)]
    username: String,

    #[arg(short, long, env = "EQUIPDASH_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
struct SignupArgs {
    #[arg(short, long)]
    username: String,

    #[arg(short, long, env = "EQUIPDASH_PASSWORD", hide_env_values = true)]
    password: String,

    /// Repeat of the password
    #[arg(long)]
    confirm_password: String,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    init_logging(config.log_json)?;

    tracing::debug!(
        api = %config.api_base_url,
        store = %config.token_storage_file.display(),
        "Starting equipdash"
    );

    let store = Arc::new(FileCredentialStore::open(&config.token_storage_file));
    let client = ApiClient::new(&config, store)?;

    match cli.command {
        Command::Login(args) => {
            let auth = AuthService::new(client);
            let session = auth
                .login(LoginRequest {
                    username: args.username,
                    password: args.password,
                })
                .await?;
            println!("Welcome, {}!", session.user.display_name());
        }
        Command::Signup(args) => {
            let auth = AuthService::new(client);
            let session = auth
                .signup(SignupRequest {
                    username: args.username,
                    password: args.password,
                    confirm_password: args.confirm_password,
                    email: args.email,
                    first_name: args.first_name,
                    last_name: args.last_name,
                })
                .await?;
            println!("Account created. Welcome, {}!", session.user.display_name());
        }
        Command::Logout => {
            AuthService::new(client).logout().await?;
            println!("Logged out.");
        }
        Command::Whoami => {
            let auth = AuthService::new(client.clone());
            if !auth.is_authenticated() {
                println!("Not logged in.");
                return Ok(());
            }
            let user = client.get_profile().await?;
            println!("{} (id {})", user.username, user.id);
            if let Some(email) = user.email.as_deref() {
                println!("  email: {}", email);
            }
        }
        Command::Upload { path } => {
            let mut uploads = UploadService::new(client);
            let record = uploads.upload_path(&path).await?;
            print_summary(&record);
        }
        Command::History { limit, offset } => {
            let mut uploads = UploadService::new(client);
            let history = uploads.refresh_history(limit, offset).await?;

            if history.is_empty() {
                println!("No uploads yet.");
                return Ok(());
            }

            println!(
                "Showing {} of {} uploads",
                history.records().len(),
                history.total_count()
            );
            for record in history.records() {
                println!(
                    "  #{:<5} {:<32} {:>6} rows  {}",
                    record.id,
                    record.filename,
                    record.row_count,
                    record.uploaded_at.format("%Y-%m-%d %H:%M")
                );
            }
            if let Some(latest) = history.latest() {
                println!();
                print_summary(latest);
            }
        }
    }

    Ok(())
}

fn print_summary(record: &UploadRecord) {
    println!("{} (uploaded by {})", record.filename, record.uploaded_by);
    println!("  rows:            {}", record.row_count);
    println!("  avg power:       {:.2}", record.avg_power);
    println!("  avg usage hours: {:.2}", record.avg_usage_hours);
    println!("  equipment:");
    for (name, count) in record.equipment_by_count() {
        println!("    {:<20} {}", name, count);
    }
}

/// Initialize logging to stderr; JSON lines when `LOG_FORMAT=json`.
fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("equipdash=warn"))?;

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}
