//! # Meu Caixa Register
//!
//! The new-sale screen of the register: one sale session driven from a
//! line-oriented console.
//!
//! ## Module Organization
//! ```text
//! caixa_register/
//! ├── lib.rs            ◄─── You are here (startup & run)
//! ├── config.rs         ◄─── register.toml + CAIXA_* overrides
//! ├── collaborators.rs  ◄─── ProductCatalog / SaleRecorder traits
//! ├── session.rs        ◄─── SaleSession: cart + search state
//! ├── view.rs           ◄─── CartView snapshot for display
//! ├── console.rs        ◄─── Command parsing & rendering
//! └── error.rs          ◄─── ApiError shown to the cashier
//! ```

pub mod collaborators;
pub mod config;
pub mod console;
pub mod error;
pub mod session;
pub mod view;

use std::path::PathBuf;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use caixa_db::{Database, DbConfig};
use config::RegisterConfig;
use error::ApiError;
use session::SaleSession;

/// Runs the register until the cashier quits or stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Register Startup                                  │
/// │                                                                         │
/// │  1. Initialize Logging ──► tracing-subscriber on stderr, RUST_LOG      │
/// │  2. Load Config ─────────► defaults → register.toml → CAIXA_* env      │
/// │  3. Resolve DB Path ─────► config / CAIXA_DB_PATH / platform data dir  │
/// │  4. Connect ─────────────► SQLite (WAL) + migrations                   │
/// │  5. New Sale ────────────► SaleSession over the database               │
/// │  6. Console loop ────────► stdin commands, stdout replies              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> Result<(), ApiError> {
    init_tracing();

    info!("Starting Meu Caixa register");

    let config = RegisterConfig::load(config_path)?;
    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::for_path(&db_path)).await?;
    info!("Database connected and migrations applied");

    let mut session = SaleSession::new(db.clone(), db.clone(), config.search.limit);

    console::run(
        &mut session,
        &config.currency,
        &config.store.name,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    if !session.cart().is_empty() {
        info!(
            lines = session.cart().line_count(),
            "Leaving with an unfinished sale"
        );
    }

    db.close().await;
    info!("Register closed");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they never interleave with console replies.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=caixa=trace` - Show trace for caixa crates only
/// - Default: INFO, DEBUG for caixa crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caixa=debug,sqlx=warn"));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
