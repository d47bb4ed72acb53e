use anyhow::{Context, Result};
use tlparser::{http, telemetry, Config, InMemoryBroker, InMemoryDocumentStore, Runtime};

fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(&config.log_filter);

    // Blocking HTTP clients are built before any async runtime exists
    let broker = InMemoryBroker::with_retention(config.broker_retention);
    let runtime = Runtime::start(&config, broker, InMemoryDocumentStore::new())?;
    let app = http::router(runtime.services());

    tracing::info!(addr = %config.http_addr, "starting tlparser");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(async {
            let listener = tokio::net::TcpListener::bind(&config.http_addr)
                .await
                .with_context(|| format!("failed to bind {}", config.http_addr))?;
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await
                .context("http server failed")
        })?;

    for (topic, stats) in runtime.shutdown() {
        tracing::info!(topic = %topic, ?stats, "dispatcher stats");
    }
    Ok(())
}
