//! Depot client CLI.
//!
//! A thin interactive surface over the controller library: it launches the
//! background units and renders their events, never blocking on network I/O
//! itself. The bearer token from `login` is persisted to a session file so
//! later invocations stay authenticated.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use depot_client::api::{ApiClient, Session};
use depot_client::auth::{spawn_login, spawn_register, AuthEvent};
use depot_client::config::ClientConfig;
use depot_client::sync::{spawn_list_sync, ListEvent};
use depot_client::upload::{UploadEvent, UploadHandle, UploadOutcome};
use depot_client::types::Credentials;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "depot-client", about = "Upload files to a Depot server")]
struct Cli {
    /// Server endpoint (defaults to DEPOT_ENDPOINT or http://localhost:8000)
    #[arg(long)]
    endpoint: Option<String>,

    /// Where the bearer token from `login` is stored
    #[arg(long, default_value = ".depot-session")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new account
    Register { username: String },
    /// Log in and store the session token
    Login { username: String },
    /// Upload a file (Ctrl+C cancels)
    Upload { path: PathBuf },
    /// Print the current upload listing once
    List,
    /// Poll the upload listing and print it whenever it changes
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "depot_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    let session = Session::new();
    if let Ok(saved) = std::fs::read_to_string(&cli.session_file) {
        let saved = saved.trim();
        if !saved.is_empty() {
            session.set_token(saved.to_string());
        }
    }

    let api = ApiClient::new(&config.endpoint, session.clone())?;

    match cli.command {
        Command::Register { username } => register(api, username).await,
        Command::Login { username } => login(api, session, username, &cli.session_file).await,
        Command::Upload { path } => upload(api, path, config.chunk_size).await,
        Command::List => list(api).await,
        Command::Watch => watch(api, config).await,
    }
}

async fn register(api: ApiClient, username: String) -> anyhow::Result<()> {
    let password = prompt_password()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_register(api, Credentials { username, password }, tx);

    match rx.recv().await {
        Some(AuthEvent::Registered { username }) => {
            println!("Welcome, {username}! Please log in.");
        }
        Some(AuthEvent::Failed { message }) => println!("{message}"),
        _ => {}
    }
    Ok(())
}

async fn login(
    api: ApiClient,
    session: Session,
    username: String,
    session_file: &PathBuf,
) -> anyhow::Result<()> {
    let password = prompt_password()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_login(api, Credentials { username, password }, tx);

    match rx.recv().await {
        Some(AuthEvent::LoggedIn { username }) => {
            let token = session
                .token()
                .context("login succeeded but no token was stored")?;
            std::fs::write(session_file, token).context("failed to persist session")?;
            println!("Welcome, {username}.");
        }
        Some(AuthEvent::Failed { message }) => println!("{message}"),
        _ => {}
    }
    Ok(())
}

async fn upload(api: ApiClient, path: PathBuf, chunk_size: usize) -> anyhow::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let (handle, mut events) = UploadHandle::start(api, path.clone(), chunk_size)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
            }
            event = events.recv() => match event {
                Some(UploadEvent::Progress(percent)) => {
                    print!("\rUploading {name}... {percent}%");
                    io::stdout().flush().ok();
                }
                Some(UploadEvent::Done(outcome)) => {
                    println!();
                    print_outcome(&name, outcome);
                    break;
                }
                None => break,
            },
        }
    }

    handle.join().await;
    Ok(())
}

fn print_outcome(name: &str, outcome: UploadOutcome) {
    match outcome {
        UploadOutcome::Completed => println!("Upload complete: {name}"),
        UploadOutcome::Conflict => println!("Conflict: file {name} already exists."),
        UploadOutcome::Cancelled => println!("Upload cancelled: {name}"),
        UploadOutcome::ConnectionFailed => println!("Connection to the server was lost."),
        UploadOutcome::ServerError(status) => {
            println!("({status}) Something went wrong while uploading {name}")
        }
    }
}

async fn list(api: ApiClient) -> anyhow::Result<()> {
    match api.list_files().await {
        Ok(files) => {
            for file in files {
                println!("{file}");
            }
        }
        Err(err) => println!("{}", list_failure_message(&err)),
    }
    Ok(())
}

/// A 403 on the listing means the stored session is missing or stale, not
/// that a password was wrong, so it gets its own wording.
fn list_failure_message(err: &depot_client::error::ClientError) -> &'static str {
    match err.status() {
        Some(403) => "You need to login first.",
        _ => depot_client::auth::describe_failure(err),
    }
}

async fn watch(api: ApiClient, config: ClientConfig) -> anyhow::Result<()> {
    if !api.session().is_authenticated() {
        println!("You need to login first.");
        return Ok(());
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_list_sync(api, config.poll_interval, tx);

    println!("Watching for new uploads (Ctrl+C to stop)...");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => match event {
                Some(ListEvent::Replaced(files)) => {
                    println!("--- {} file(s) ---", files.len());
                    for file in files {
                        println!("{file}");
                    }
                }
                None => break,
            },
        }
    }
    Ok(())
}

/// Prompt for a password on stderr and read it from stdin. The value is
/// never logged.
fn prompt_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut password = String::new();
    io::stdin()
        .lock()
        .read_line(&mut password)
        .context("failed to read password")?;
    let password = password.trim_end_matches(['\r', '\n']).to_string();
    anyhow::ensure!(!password.is_empty(), "password must not be empty");
    Ok(password)
}
