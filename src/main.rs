use brokerdesk::bootstrap;
use brokerdesk::config::Config;
use brokerdesk::infrastructure::http::router::build_router;
use brokerdesk::infrastructure::observability;
use brokerdesk::infrastructure::persistence::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing and metrics
    let _guard = observability::init(&config).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations().await?;
    tracing::info!("Database migrations applied");

    if config.seed_brokers {
        bootstrap::seed_default_brokers(&db)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed brokers: {}", e))?;
    }

    // Build application state
    let state = bootstrap::build_app_state(db, &config)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let worker_manager = state.worker_manager.clone();

    // Start the worker eagerly; health checks restart it if it dies
    worker_manager.ensure_started().await;

    let app = build_router(state);

    // Start server
    let addr = config.server_address();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker_manager.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
