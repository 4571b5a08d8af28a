//! chapter-succession HTTP service.

use std::sync::Arc;

use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use chapter_succession::adapters::events::LoggingEventPublisher;
use chapter_succession::adapters::http::{api_router, SuccessionHandlers};
use chapter_succession::adapters::wiring::SuccessionPorts;
use chapter_succession::config::AppConfig;
use chapter_succession::ports::EventPublisher;
use chapter_succession::telemetry;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("chapter-succession: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init(&config.server)?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let publisher: Arc<dyn EventPublisher> = Arc::new(LoggingEventPublisher::new());
    let handlers = SuccessionHandlers::new(
        SuccessionPorts::postgres(pool, publisher),
        config.scoring.partial_scoring_policy,
    );

    let app = api_router(handlers).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(config.server.request_timeout())),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        scoring_policy = %config.scoring.partial_scoring_policy.as_str(),
        "chapter-succession listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("chapter-succession stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
