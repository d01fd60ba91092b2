//! Owned KV - An in-memory key-value server with per-key ownership
//!
//! `owned_kv serve` runs the HTTP server; `owned_kv add-user` registers an
//! identity in the user database.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use owned_kv::users::{UserDatabase, UserStorage};
use owned_kv::{server, Config};

const LOG_FILE: &str = "store.log";

#[derive(Parser)]
#[command(name = "owned_kv")]
#[command(about = "In-memory key-value server with per-key ownership", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on (overrides SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum number of keys, 0 for unbounded (overrides LRU_DEPTH)
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Register a user in the user database
    AddUser {
        /// Name of the new user
        username: String,

        /// Clear-text password, stored hashed
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env();

    init_tracing(&config)?;

    match cli.command {
        Commands::Serve { port, depth } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(depth) = depth {
                config.lru_depth = depth;
            }
            info!("Starting Owned KV server");
            server::listen(config).await
        }
        Commands::AddUser { username, password } => add_user(&config, &username, &password),
    }
}

/// Console logging filtered by RUST_LOG, plus a plain-text copy in
/// `LOG_DIR/store.log` when LOG_DIR is set.
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let file_layer = match &config.log_dir {
        Some(dir) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(dir)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "owned_kv=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn open_log_file(dir: &Path) -> anyhow::Result<File> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))
}

fn add_user(config: &Config, username: &str, password: &str) -> anyhow::Result<()> {
    let users = UserStorage::load(&config.users_path);
    users
        .add_user(username, password)
        .with_context(|| format!("cannot add user {}", username))?;
    users
        .save(&config.users_path)
        .with_context(|| format!("cannot save {}", config.users_path.display()))?;
    info!("User {} added", username);
    Ok(())
}
