use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradefest::config::Config;
use tradefest::services::Catalog;
use tradefest::{app, websocket, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradefest=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Starting Tradefest server on {}:{}", config.host, config.port);

    // Refuse to run on a broken catalog
    let catalog = Catalog::builtin();
    catalog.validate()?;
    info!(
        "Catalog loaded: {} instruments, {} events, {} routes, {} trading days",
        catalog.instruments().len(),
        catalog.events().len(),
        catalog.routes().len(),
        catalog.calendar().len()
    );

    let addr = config.addr();
    let state = AppState::with_catalog(config, catalog);
    let game = state.game.clone();

    let fanout = websocket::spawn_fanout(game.clone(), state.room_manager.clone());

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Tradefest server listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Loop must be down before the process exits
    game.stop()?;
    fanout.abort();
    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
