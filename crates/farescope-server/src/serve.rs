use crate::config::FarescopeConfig;
use crate::http::{self, AppState};
use crate::pipeline::Pipeline;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub async fn run(config: FarescopeConfig) -> anyhow::Result<()> {
    info!("Starting Farescope server v{}", env!("CARGO_PKG_VERSION"));
    info!("HTTP: {}", config.server.http_addr);

    let pipeline = Pipeline::from_config(&config)?;
    if pipeline.data.has_live_source() {
        info!("Flight data: live provider at {}", config.upstream.aviation_stack_base_url);
    } else {
        info!("Flight data: no provider key, serving mock data");
    }
    if pipeline.insights.has_model() {
        info!("Insights: model {}", config.upstream.openai_model);
    } else {
        info!("Insights: no model key, serving templated insights");
    }

    let state = AppState {
        pipeline,
        credentials: config.credentials(),
        start_time: std::time::Instant::now(),
    };

    let app = http::create_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.server.http_addr).await?;
    info!("Farescope server ready on {}", config.server.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, terminating...");
}
