use rootcause::prelude::Report;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voxbridge_relay::Dispatcher;
use voxbridge_server::{
    AppState, ServerConfig, ServerError, build_orchestrator, build_telegram, create_router,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(report) = run().await {
        tracing::error!("{}", report);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<ServerError>> {
    // Load configuration from environment
    let config = ServerConfig::from_env().map_err(|e| ServerError::Config {
        reason: e.to_string(),
    })?;
    config.validate()?;
    tracing::info!(
        model = %config.completion.model,
        workers = config.dispatch.workers,
        "Loaded configuration"
    );

    let telegram = Arc::new(build_telegram(&config)?);
    let orchestrator = Arc::new(build_orchestrator(&config, Arc::clone(&telegram))?);
    let dispatcher = Dispatcher::start(orchestrator, &config.telegram_token, &config.dispatch);

    let state = AppState::new(dispatcher.handle(), telegram, config.webhook_url());
    let app = create_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", addr);

    // The router owns the last external dispatch handle, so it must be gone
    // before the dispatcher can drain.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Serve {
            reason: e.to_string(),
        })?;

    tracing::info!("Server stopped, draining queued updates");
    dispatcher.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
