use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use rollcall_app::app::api::routes;
use rollcall_app::config::ConfigHandler;
use rollcall_app::db_handler::DbProviderHandler;
use rollcall_app::services::{AppServices, ServicesHandler};
use rollcall_core::clock::{Clock, SystemClock};
use rollcall_core::config::load_config;
use rollcall_db::db::connection::create_pool;
use rollcall_db::db::migrate::run_migrations;
use rollcall_service::face::FaceServiceClient;
use rollcall_service::finalizer::{FinalizerConfig, SessionFinalizer};
use rollcall_service::recorder::AttendanceRecorder;
use rollcall_service::store::PgAttendanceStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting attendance tracker");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_migrations(&config.database.url).await?;

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
        config.finalizer.call_timeout(),
    )
    .await?;

    tracing::info!("Database connection pool created.");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.finalizer.tz()?));
    let store = Arc::new(PgAttendanceStore::new(pool.clone()));
    let finalizer = Arc::new(SessionFinalizer::new(
        Arc::clone(&store),
        Arc::clone(&clock),
        FinalizerConfig::from(&config.finalizer),
    ));
    let face = FaceServiceClient::from_config(&config.face_service)?;
    if face.is_none() {
        tracing::info!("No face service configured; unenroll calls are skipped");
    }

    let finalizer_handle = if config.finalizer.enabled {
        Some(Arc::clone(&finalizer).start())
    } else {
        tracing::warn!("Session finalizer disabled; sessions are only finalized on demand");
        None
    };

    let services = Arc::new(AppServices {
        recorder: AttendanceRecorder::new(store),
        finalizer,
        clock,
        face,
    });

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(DbProviderHandler { provider: pool })
        .hoop(ConfigHandler {
            settings: config.clone(),
        })
        .hoop(ServicesHandler { services })
        .push(routes());

    let server = salvo::Server::new(acceptor);
    let server_handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received");
        server_handle.stop_graceful(None);
    });

    tracing::info!("Server listening on {bind_addr}");

    server.serve(router).await;

    if let Some(handle) = finalizer_handle {
        handle.stop().await;
    }

    tracing::info!("Server stopped");

    Ok(())
}
