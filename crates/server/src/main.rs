use std::sync::Arc;

use clap::Parser;
use tracing::info;

use edon_connectors::{ConnectorRegistry, EmailConnector, FilesystemConnector, RemoteBotProxy, SearchConnector};
use edon_server::config::GatewayConfig;
use edon_server::metrics::Metrics;
use edon_server::state::AppState;
use edon_store::SqliteStore;
use edon_vault::Vault;

/// Edon policy-enforcement gateway HTTP server.
#[derive(Parser, Debug)]
#[command(name = "edon-server", about = "Standalone HTTP server for the Edon policy-enforcement gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "edon.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = GatewayConfig::load(&cli.config)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    if config.json_logging {
        tracing_subscriber::fmt().with_env_filter(env_filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    for warning in config.validate_for_startup()? {
        tracing::warn!(%warning, "startup config warning");
    }
    edon_server::anti_bypass::run_startup_checks(&config)?;

    let store = SqliteStore::connect(&config.store_config()).await?;

    let master_key = if config.vault_master_key.is_empty() {
        tracing::warn!("VAULT_MASTER_KEY is unset; using an ephemeral key, credentials will not survive a restart");
        edon_vault::parse_master_key(&uuid::Uuid::new_v4().simple().to_string().repeat(2))?
    } else {
        edon_vault::parse_master_key(&config.vault_master_key)?
    };

    let vault = Arc::new(Vault::new(store.clone(), master_key, config.credentials_strict));
    let auditor = Arc::new(edon_auditor::Auditor::new(store.clone()));
    let rate_limiter = Arc::new(edon_ratelimit::RateLimiter::new(store.clone()));

    let mut connectors = ConnectorRegistry::new();
    connectors.register(Arc::new(EmailConnector::new()));
    connectors.register(Arc::new(FilesystemConnector::new(&config.filesystem_sandbox_root)));
    if let Some(base_url) = config.clawdbot_base_url.clone() {
        connectors.register(Arc::new(RemoteBotProxy::new(base_url)));
    }
    if let Some(endpoint) = config.search_endpoint.clone() {
        connectors.register(Arc::new(SearchConnector::new(endpoint)));
    }
    info!(connectors = ?connectors.list(), "connectors registered");

    let state = AppState {
        store,
        vault,
        auditor,
        rate_limiter,
        connectors: Arc::new(connectors),
        config: Arc::new(config.clone()),
        metrics: Arc::new(Metrics::new()),
    };

    let app = edon_server::api::router(state);

    let host = cli.host.unwrap_or(config.host);
    let port = cli.port.unwrap_or(config.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "edon-server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("edon-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
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
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
