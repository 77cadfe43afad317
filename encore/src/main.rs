use anyhow::Result;
use tracing::{error, info};

use encore_core::{
    bootstrap::{init_database, init_services},
    logging, Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (file path from ENCORE_CONFIG, env overrides on top)
    let config_path = std::env::var("ENCORE_CONFIG").ok();
    let config = Config::load(config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    // 2. Validate configuration (fail fast on misconfigurations)
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    // 3. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("Encore server starting...");
    info!("HTTP address: {}", config.http_address());

    // 4. Initialize database (schema migrations are managed externally)
    let pool = init_database(&config).await?;

    // 5. Initialize services
    let services = init_services(pool, &config)?;

    // 6. Build the router and serve
    let addr = config.http_address();
    let router = encore_api::create_router(services, config);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        anyhow::anyhow!("Failed to bind {addr}: {e}")
    })?;

    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    info!("Encore server stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM so in-flight requests drain before exit.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
