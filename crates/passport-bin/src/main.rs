use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use passport_lib::{
    cache::MemoryTtlStore,
    config::Settings,
    router,
    users::MemoryUserRepo,
    AppState,
};

/// HomeStay passport service
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize configuration
    let settings = Settings::load_from(&args.config)?;

    // Initialize tracing; RUST_LOG overrides the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    // The in-process store implementations back standalone deployments;
    // clustered ones implement the traits against their shared stores.
    let cache = Arc::new(MemoryTtlStore::new());
    let users = Arc::new(MemoryUserRepo::new());

    // Create application state and the router
    let state = AppState::new(cache, users, settings.clone());
    let app = router::create_router(state);

    // Start the server
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "passport service listening");

    axum::serve(listener, app).await?;

    Ok(())
}
