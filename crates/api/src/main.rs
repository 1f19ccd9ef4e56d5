use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunedrop_api::app::build_app;
use tunedrop_api::background::session_sweeper;
use tunedrop_api::config::ServerConfig;
use tunedrop_api::sessions::SessionRegistry;
use tunedrop_api::state::AppState;
use tunedrop_core::collaborators::{BpmDetector, CanonicalWalletResolver};
use tunedrop_remote::{RemoteCollaborators, RemoteConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunedrop_api=debug,tunedrop_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let remote_config = RemoteConfig::from_env();
    tracing::info!(
        store_url = %remote_config.store_url,
        storage_url = %remote_config.storage_url,
        geocoder_url = %remote_config.geocoder_url,
        bpm_detection = remote_config.bpm_detector_url.is_some(),
        "Loaded remote configuration"
    );

    // --- Collaborators ---
    let remote =
        RemoteCollaborators::from_config(&remote_config).expect("Failed to build HTTP client");
    let geocoder = Arc::new(remote.geocoder);

    // --- Sessions ---
    let sessions = Arc::new(SessionRegistry::new());
    let sweeper_cancel = CancellationToken::new();
    let sweeper_handle = tokio::spawn(session_sweeper::run(
        Arc::clone(&sessions),
        Duration::from_secs(config.session_idle_timeout_secs),
        sweeper_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        sessions,
        identity: Arc::new(CanonicalWalletResolver),
        store: Arc::new(remote.store),
        storage: Arc::new(remote.storage),
        autocomplete: geocoder.clone(),
        geocoder,
        bpm_detector: remote
            .bpm_detector
            .map(|detector| Arc::new(detector) as Arc<dyn BpmDetector>),
    };

    let app = build_app(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweeper_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
