use std::sync::Arc;

use tracing::info;

use stash::auth::TokenIssuer;
use stash::web::AppState;
use stash::{BlobStore, Config, Database, HostingService};

#[tokio::main]
async fn main() -> stash::Result<()> {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = stash::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        stash::logging::init_console_only(&config.logging.level);
    }

    info!("STASH - multi-tenant file hosting service");

    let db = Database::open(&config.database.path).await?;
    let store = BlobStore::new(&config.storage.path)?;
    let service =
        HostingService::new(db, store).with_max_upload_size(config.max_upload_size_bytes());
    let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_expiry_secs);

    let state = Arc::new(AppState::new(service, tokens));
    stash::web::serve(&config, state).await
}
