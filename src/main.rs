//! Pocket Tracker - TCG Pocket collection server
//!
//! Serves the card catalog, per-user owned-card collections, public profiles
//! keyed by friend ID, and collection comparisons over a JSON API.

use clap::Parser;
use pocket_tracker::catalog::CardCatalog;
use pocket_tracker::database::init_schema;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// TCG Pocket collection tracker server
#[derive(Parser, Debug)]
#[command(name = "pocket_tracker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Path to the card catalog JSON file
    #[arg(short, long, default_value_t = default_catalog_path())]
    catalog: String,

    /// Port for the HTTP API
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Download the latest catalog from upstream before serving
    #[arg(long, default_value_t = false)]
    sync_catalog: bool,
}

/// Returns the default database path: ~/.local/share/pocket_tracker/tracker.db
fn default_db_path() -> String {
    data_dir().join("tracker.db").to_string_lossy().to_string()
}

/// Returns the default catalog path: ~/.local/share/pocket_tracker/cards.json
fn default_catalog_path() -> String {
    data_dir().join("cards.json").to_string_lossy().to_string()
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pocket_tracker")
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let db_path = PathBuf::from(&args.database);
    let catalog_path = PathBuf::from(&args.catalog);

    log::info!("Starting pocket_tracker...");
    log::info!("Database path: {}", db_path.display());
    log::info!("Catalog path: {}", catalog_path.display());

    // Ensure parent directories exist
    for path in [&db_path, &catalog_path] {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::error!("Failed to create directory {}: {}", parent.display(), e);
                    std::process::exit(1);
                }
                log::info!("Created directory: {}", parent.display());
            }
        }
    }

    // Refresh the catalog from upstream when requested
    let catalog = if args.sync_catalog {
        match CardCatalog::fetch().await {
            Ok(catalog) => {
                if let Err(e) = catalog.save(&catalog_path) {
                    log::error!("Failed to write catalog file: {}", e);
                    std::process::exit(1);
                }
                catalog
            }
            Err(e) => {
                log::error!("Failed to fetch catalog: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match CardCatalog::load(&catalog_path) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Failed to load catalog: {}", e);
                log::error!("Run with --sync-catalog to download the current card list");
                std::process::exit(1);
            }
        }
    };
    log::info!(
        "Catalog ready: {} cards, {} rarities, {} packs",
        catalog.len(),
        catalog.rarities().len(),
        catalog.packs().len()
    );

    // Open database connection
    let conn = match Connection::open(&db_path) {
        Ok(conn) => {
            log::info!("Opened database: {}", db_path.display());
            conn
        }
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize database schema
    if let Err(e) = init_schema(&conn) {
        log::error!("Failed to initialize database schema: {}", e);
        std::process::exit(1);
    }

    // Wrap connection in Arc<Mutex> for thread-safe sharing
    let db = Arc::new(Mutex::new(conn));

    if let Err(e) = pocket_tracker::web::serve(db, Arc::new(catalog), args.port).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
