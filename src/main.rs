use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use finreport::config::{LogFormat, Settings};
use finreport::generator::Generator;
use finreport::generator::demo::DemoGenerator;
use finreport::generator::gemini::GeminiGenerator;
use finreport::generator::retry::Retrying;
use finreport::http::{self, AppState};
use finreport::service::ReportService;
use finreport::store::sqlite::SqliteStore;

const DEFAULT_LOG_FILTER: &str = "finreport=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so .env values feed the env fallbacks.
    let dotenv = dotenvy::dotenv();
    let settings = Settings::parse();
    init_tracing(settings.log_format);

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded environment file"),
        Err(_) => tracing::debug!("no .env file, using process environment"),
    }

    let db_path = settings.database_path()?;
    let store = SqliteStore::new(&db_path)
        .with_context(|| format!("failed to open report database at {db_path}"))?;
    tracing::info!(path = %db_path, "report database ready");

    let generator: Arc<dyn Generator> = match settings.api_key() {
        Some(key) => {
            let gemini = GeminiGenerator::new(key, &settings.api_base_url)?;
            let policy = settings.retry_policy();
            tracing::info!(
                model = %settings.model,
                max_attempts = policy.max_attempts,
                timeout_secs = policy.timeout.as_secs(),
                "using Gemini generator"
            );
            Arc::new(Retrying::new(Arc::new(gemini), policy))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, serving demo content");
            Arc::new(DemoGenerator)
        }
    };

    let service = ReportService::new(generator, Arc::new(store), settings.generation_options());
    let app = http::router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;
    tracing::info!(addr = %settings.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
