use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;

use llm_gateway::adapters::{gateway_router, observability};
use llm_gateway::application::Gateway;
use llm_gateway::bootstrap::build_gateway;
use llm_gateway::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let tracer = observability::init(&config.telemetry());
    let gateway = Arc::new(build_gateway(&config, tracer).await?);
    spawn_bucket_sweep(Arc::clone(&gateway), config.server.bucket_sweep_interval());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        credit_limit = config.limits.credit_limit,
        "LLM gateway listening"
    );

    axum::serve(listener, gateway_router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("LLM gateway stopped");
    Ok(())
}

/// Periodically evicts rate buckets that have refilled completely.
fn spawn_bucket_sweep(gateway: Arc<Gateway>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = gateway.prune_idle(Instant::now());
            if evicted > 0 {
                tracing::debug!(evicted, "Pruned idle rate buckets");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
