//! Resolver Data Entry Server
//!
//! Stores GS1 resolver documents keyed by anchor and exposes CRUD endpoints
//! for data entry tools.
//!
//! # Configuration
//!
//! Environment variables:
//! - `RESOLVER_PORT`: Port to listen on (default: 8080)
//! - `RESOLVER_DATABASE_PATH`: SQLite database file
//!   (default: ~/.local/share/resolver-data-entry/resolver.db)
//! - `SESSION_TOKEN`: Bearer token required on protected routes
//!
//! # Config File Format
//!
//! ```yaml
//! port: 8080
//! database_path: /var/lib/resolver/resolver.db
//! session_token: "your-secret-token-here"
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resolver_data_entry::config::Config;
use resolver_data_entry::server::{router, AppState};
use resolver_data_entry::store::{MemoryStore, SharedStore, SqliteStore};

#[derive(Parser)]
#[command(name = "resolver-data-entry")]
#[command(version)]
#[command(about = "Data entry server for GS1 resolver documents", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and environment)
    #[arg(long, short)]
    port: Option<u16>,

    /// Keep documents in memory instead of SQLite
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resolver_data_entry=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config)?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let store: SharedStore = if cli.memory {
        tracing::info!("Using in-memory document store");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!("Database: {}", config.database_path.display());
        Arc::new(SqliteStore::open(&config.database_path).await?)
    };

    if config.session_token.is_none() {
        tracing::warn!("No session token configured - all authenticated requests will fail");
    }

    let app = router(AppState::new(store, config.session_token));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
