//! Socksguard - SOCKS5 Authentication Front-End
//!
//! This is the main entry point for the Socksguard application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use socksguard::config::{load_config, Config};
use socksguard::server::Server;
use socksguard::socks::Negotiator;
use socksguard::store::open_store;
use socksguard::SocksguardError;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Socksguard - SOCKS5 front-end with username/password authentication
#[derive(Parser, Debug)]
#[command(name = "socksguard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Accept SOCKS5 connections
    Serve {
        /// Listen address, overrides the configuration file
        #[arg(long)]
        listen: Option<String>,

        /// Require username/password authentication
        #[arg(long)]
        auth: bool,
    },

    /// Add a credential to the configured store
    AddUser {
        /// Login to create
        #[arg(short, long)]
        username: String,

        /// Password for the new login
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    let mut config = match &args.config {
        Some(path) => {
            let config = load_config(path)?;
            info!("Configuration loaded from: {:?}", path);
            config
        }
        None => Config::default(),
    };

    match args.command {
        Command::Serve { listen, auth } => {
            if let Some(listen) = listen {
                config.server.listen_addr = listen;
            }
            config.server.auth_required |= auth;
            serve(config).await
        }
        Command::AddUser { username, password } => add_user(config, &username, &password).await,
    }
}

/// Run the acceptor until the process is told to stop
async fn serve(config: Config) -> Result<()> {
    config.validate()?;

    info!("Socksguard v{}", socksguard::VERSION);

    let store = if config.server.auth_required {
        let store = open_store(&config.store).await?;
        info!("Using {} credential store", store.backend());
        Some(store)
    } else {
        None
    };

    let negotiator = Negotiator::from_config(&config.server, store);
    let server = Server::bind(&config.server.listen_addr, negotiator).await?;

    tokio::select! {
        result = server.listen() => result,
        result = shutdown_signal() => result,
    }
}

/// Create a credential in the configured store
async fn add_user(config: Config, username: &str, password: &str) -> Result<()> {
    config.store.validate()?;

    let store = open_store(&config.store).await?;
    let timeout = config.server.lookup_timeout();

    let credential = tokio::time::timeout(timeout, store.create(username, password.as_bytes()))
        .await
        .with_context(|| format!("Creating '{}' timed out after {:?}", username, timeout))?
        .map_err(SocksguardError::Store)
        .with_context(|| format!("Failed to create '{}'", username))?;

    println!("{}", credential.login());
    Ok(())
}

/// Wait for Ctrl+C or, on unix, SIGTERM
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl+C")?;
                info!("Received Ctrl+C, shutting down...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        // On Windows, only handle Ctrl+C
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        info!("Received Ctrl+C, shutting down...");
    }

    Ok(())
}

/// Setup logging based on command-line flags
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
