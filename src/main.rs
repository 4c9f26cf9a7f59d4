//! Interval Bell - A state-managed interval timer that chimes on a fixed cycle
//!
//! This is the main entry point for the interval-bell application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use interval_bell::{
    api::create_router,
    config::Config,
    services::load_player,
    state::AppState,
    tasks::clock_tick_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("interval_bell={},tower_http=info", config.log_level()))
        .init();

    info!("Starting interval-bell server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, interval={}, sound={}",
          config.host, config.port, config.interval, config.sound.display());

    // Load the chime once; playback problems fall back to the terminal bell
    let audio = load_player(&config.sound);

    // Create application state, idle with the configured interval selected
    let state = Arc::new(AppState::new(config.port, config.host.clone(), config.interval, audio));

    // Start the clock tick background task
    let tick_state = Arc::clone(&state);
    let clock_tick = tokio::spawn(async move {
        clock_tick_task(tick_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start           - Start chiming with the selected interval");
    info!("  POST /pause           - Pause, keeping the remaining time");
    info!("  POST /resume          - Resume from the remaining time");
    info!("  POST /stop            - Stop and return to idle");
    info!("  PUT  /interval        - Set the interval selection {{\"minutes\": n}}");
    info!("  POST /preset/:minutes - Select a quick preset");
    info!("  GET  /presets         - List quick presets");
    info!("  GET  /status          - Clock, timer state and next chime");
    info!("  GET  /health          - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);
    let shutdown = async {
        if let Err(e) = shutdown_signal().await {
            tracing::error!("Failed to listen for shutdown signals: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown => {
            info!("Shutdown signal received");
        }
    }

    // Tear down timers before the state goes away
    clock_tick.abort();
    state.shutdown();

    info!("Server shutdown complete");
    Ok(())
}
