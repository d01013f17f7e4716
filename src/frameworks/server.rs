// Framework bootstrap for the overlay service runtime.

use crate::domain::SystemClock;
use crate::frameworks::config::Settings;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{DerivedView, EngineSettings, SnapshotProcessor, engine_task};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serve the overlay API on an already bound listener.
pub async fn run(listener: tokio::net::TcpListener, settings: Settings) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(&settings);
    let app = routes::app(state, settings.body_limit_bytes);

    tracing::info!(
        %address,
        active_phases = ?settings.active_phases,
        "listening for game state on POST /, serving /damage_data and /delivery_data"
    );

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

/// Load settings, bind the configured address and serve.
pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let settings = Settings::load().map_err(|e| {
        tracing::error!(error = %e, "failed to load settings");
        std::io::Error::other(e)
    })?;
    let address = SocketAddr::new(settings.bind_addr, settings.port);

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, settings).await
}

fn build_state(settings: &Settings) -> Arc<AppState> {
    let (ingest_tx, ingest_rx) = mpsc::channel(settings.ingest_capacity);
    let (view_tx, _view_rx) = watch::channel(Arc::new(DerivedView::default()));

    // The engine task is the only writer of derived state.
    tokio::spawn(engine_task(
        ingest_rx,
        view_tx.clone(),
        SnapshotProcessor::new(settings.active_phases),
        SystemClock,
        EngineSettings {
            stale_after: settings.stale_after,
            stale_check_interval: settings.stale_check_interval,
        },
    ));
    tracing::debug!(
        ingest_capacity = settings.ingest_capacity,
        stale_after_secs = settings.stale_after.as_secs(),
        "snapshot engine started"
    );

    Arc::new(AppState { ingest_tx, view_tx })
}
