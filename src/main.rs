use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use connection_settings::config::AppConfig;
use connection_settings::connections::{ConnectionStore, ConnectivityChecker, JsonFileBackend};
use connection_settings::settings::console::run_console;
use connection_settings::settings::{SettingsPresenter, settings_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;
    let addr = SocketAddr::new(config.bind_addr, config.port);

    eprintln!("🔌 Connection Settings v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Data: {}", config.data_path.display());
    eprintln!("   API: http://{}/api/connections", addr);
    eprintln!("   Probe timeout: {}s", config.probe_timeout.as_secs());

    // ── Store ───────────────────────────────────────────────────────────
    let backend = Arc::new(JsonFileBackend::new(config.data_path.clone()));
    let store = ConnectionStore::open(backend, config.default_endpoint.clone())
        .await
        .with_context(|| format!("opening {}", config.data_path.display()))?;
    eprintln!("   Servers: {} configured", store.len());

    let checker = ConnectivityChecker::new(config.probe_timeout);
    let presenter = SettingsPresenter::new(store, checker);

    // ── HTTP API ────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let app = settings_routes(Arc::clone(&presenter));
    let server = tokio::spawn(async move {
        tracing::info!(%addr, "Settings server started");
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Settings server stopped");
        }
    });

    // ── Console ─────────────────────────────────────────────────────────
    if config.console {
        tokio::select! {
            _ = run_console(Arc::clone(&presenter)) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    } else {
        eprintln!("   Console: disabled (Ctrl-C to stop)");
        tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    }

    server.abort();
    tracing::info!("Shutting down");
    Ok(())
}
