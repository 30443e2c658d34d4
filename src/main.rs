use api_rest::AppState;
use snaplog_core::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the snaplog service
///
/// Resolves configuration once from the environment (a `.env` file is honoured), then serves
/// the photo and log endpoints over HTTP until the process is stopped.
///
/// # Environment Variables
/// - `PORT`: listening port (default: 3000)
/// - `SNAPLOG_UPLOAD_DIR`: directory for uploaded photos (default: "uploads")
/// - `SNAPLOG_LOG_FILE`: append-only log file (default: "logs.txt")
/// - `SNAPLOG_BODY_LIMIT`: maximum request body size in bytes (default: 10 MiB)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("snaplog_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env_values(
        std::env::var("SNAPLOG_UPLOAD_DIR").ok(),
        std::env::var("SNAPLOG_LOG_FILE").ok(),
        std::env::var("SNAPLOG_BODY_LIMIT").ok(),
        std::env::var("PORT").ok(),
    )?;

    let addr = cfg.bind_addr();
    tracing::info!("++ Starting snaplog on {}", addr);
    tracing::info!(
        "++ Photos in {}, log at {}",
        cfg.upload_dir().display(),
        cfg.log_file().display()
    );

    let app = api_rest::router(AppState::new(&cfg), cfg.body_limit());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
