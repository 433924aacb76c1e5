use std::sync::Arc;

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use db_keepalive::{
    Config, MySqlCounterStore, Result, TlsPolicy, TlsRegistry, TrustAnchors, build_pool,
    close_pool, connect_options, shutdown, start_keepalive_loop,
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is read before logging is set up so it can carry RUST_LOG
    let dotenv = dotenvy::dotenv();

    setup_tracing();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::warn!("Warning: .env file not found"),
        Err(e) => tracing::warn!("Warning: failed to load .env file: {}", e),
    }

    let config = Config::from_env().map_err(|e| {
        tracing::error!("{}", e);
        e
    })?;
    tracing::info!("Keepalive target: {}", config.redacted_dsn());

    let trust_anchors = TrustAnchors::load(&config.ca_cert_path).map_err(|e| {
        tracing::error!("Failed to load trust anchors: {}", e);
        e
    })?;

    let mut tls_registry = TlsRegistry::new();
    tls_registry
        .register(&config.tls_policy_name, TlsPolicy::new(trust_anchors))
        .map_err(|e| {
            tracing::error!("Failed to register TLS policy: {}", e);
            e
        })?;

    let options = connect_options(&config.data_source_name, &tls_registry).map_err(|e| {
        tracing::error!("Invalid connection settings: {}", e);
        e
    })?;
    let pool = build_pool(&config.pool, options);

    let (shutdown_trigger, shutdown_signal) = shutdown::channel();

    // Not joined on shutdown: an in-flight tick is abandoned
    let _keepalive = start_keepalive_loop(
        shutdown_signal,
        Arc::new(MySqlCounterStore::new(pool.clone())),
        config.keepalive.clone(),
    );

    shutdown::wait_for_signal().await.map_err(|e| {
        tracing::error!("Failed to listen for shutdown signals: {}", e);
        e
    })?;

    tracing::info!("Shutting down");
    shutdown_trigger.trigger();

    if let Err(e) = close_pool(&pool, config.pool.close_timeout).await {
        tracing::warn!("Close error: {}", e);
    }

    Ok(())
}

fn setup_tracing() {
    // RUST_LOG wins; without it everything at info and above is shown
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_timer(UtcTime::rfc_3339()))
        .init();
}
