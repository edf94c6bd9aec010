use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nahw_api::config::ServerConfig;
use nahw_api::router::build_app_router;
use nahw_api::state::AppState;
use nahw_db::store::PgCorrectionStore;
use nahw_engine::config::EngineConfig;
use nahw_engine::error::EngineError;
use nahw_engine::gemma::GemmaLoader;
use nahw_engine::{CorrectionEngine, Corrector, EngineSlot};

/// How long shutdown waits for blocking work, such as a model load that
/// was still running when the server stopped.
const BLOCKING_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

fn main() -> ExitCode {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    let code = runtime.block_on(run());
    shutdown_runtime(runtime, BLOCKING_SHUTDOWN_GRACE);
    code
}

/// Shut the runtime down without waiting past `grace` for blocking tasks.
///
/// Dropping a runtime waits for every `spawn_blocking` task, so a signal
/// received mid-load would otherwise block exit until the load finished.
fn shutdown_runtime(runtime: Runtime, grace: Duration) {
    runtime.shutdown_timeout(grace);
}

async fn run() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    let engine_config = EngineConfig::from_env().expect("Invalid engine configuration");

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        host = %config.host,
        port = config.port,
        max_text_length = config.max_text_length,
        model = %engine_config.model_name,
        "Loaded configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = nahw_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    nahw_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    nahw_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- App state ---
    let engine = EngineSlot::empty();
    let state = AppState::new(
        Arc::new(PgCorrectionStore::new(pool.clone())),
        engine.clone(),
        config.clone(),
    )
    .expect("Failed to compile HTML templates");

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening, model loading in background");

    // --- Model ---
    // Cancelled when no device can load the model.
    let fatal = CancellationToken::new();
    let loader_handle = tokio::spawn(load_model(engine_config, engine, fatal.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(fatal.clone()))
        .await
        .expect("Server error");

    tracing::info!("Server stopped accepting connections, cleaning up");
    if loader_handle.is_finished() {
        let _ = loader_handle.await;
    }
    pool.close().await;

    if fatal.is_cancelled() {
        tracing::error!("Exiting after fatal model load failure");
        ExitCode::FAILURE
    } else {
        tracing::info!("Graceful shutdown complete");
        ExitCode::SUCCESS
    }
}

/// Load the model on a blocking thread and install it into `slot`.
///
/// On failure every device's reason has already been logged by the engine;
/// `fatal` is cancelled so the server shuts down.
async fn load_model(config: EngineConfig, slot: EngineSlot, fatal: CancellationToken) {
    let result = tokio::task::spawn_blocking(move || -> Result<CorrectionEngine, EngineError> {
        let loader = GemmaLoader::from_dir(&config.model_dir, config.seed)?;
        CorrectionEngine::initialize(Arc::new(loader), &config)
    })
    .await;

    match result {
        Ok(Ok(engine)) => {
            let device = engine.device();
            if slot.install(Arc::new(engine)).is_err() {
                tracing::warn!("Correction engine was already installed");
            }
            tracing::info!(device = %device, "Correction engine ready");
        }
        Ok(Err(err)) => {
            tracing::error!(error = %err, "Model could not be loaded on any device");
            fatal.cancel();
        }
        Err(err) => {
            tracing::error!(error = %err, "Model loading task panicked");
            fatal.cancel();
        }
    }
}

/// Wait for a termination signal or a fatal start-up failure.
///
/// Handles SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal(fatal: CancellationToken) {
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
        () = fatal.cancelled() => {
            tracing::info!("Fatal start-up failure, starting graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Instant;

    use super::*;

    #[test]
    fn shutdown_does_not_wait_for_blocking_load() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let (release, blocked) = mpsc::channel::<()>();
        let _load = runtime.spawn_blocking(move || blocked.recv());

        let started = Instant::now();
        shutdown_runtime(runtime, Duration::from_millis(50));

        assert!(started.elapsed() < Duration::from_secs(5));
        drop(release);
    }
}
