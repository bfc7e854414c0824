use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::{Config, HttpServer};
use database::{DbRepository, SqlitePool, Storage};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod shutdown;


/// The shared application state that all handlers can access.
///
/// Holds the storage port only. Handlers never keep records between requests.
pub struct AppState {
    pub storage: Box<dyn Storage>,
}

impl AppState {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self { storage: Box::new(storage) }
    }
}

/// Builds the router with every student route and the shared middleware.
pub fn app(state: Arc<AppState>, settings: &HttpServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/students",
            post(handlers::create_student).get(handlers::get_students),
        )
        .route(
            "/api/students/:id",
            get(handlers::get_student_by_id)
                .put(handlers::update_student)
                .patch(handlers::patch_student)
                .delete(handlers::delete_student)
                .head(handlers::student_exists),
        )
        .with_state(state)
        .layer(cors)
        // Logs every incoming request and its response.
        .layer(TraceLayer::new_for_http())
        // Dropping a timed-out handler also drops its in-flight query.
        .layer(TimeoutLayer::new(Duration::from_secs(settings.request_timeout_secs)))
        .layer(DefaultBodyLimit::max(settings.max_body_bytes))
}

/// Opens storage, applies the schema and serves until SIGINT/SIGTERM.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let db_pool = database::connect(&config.storage_path).await?;
    database::run_migrations(&db_pool).await?;
    tracing::info!(storage_path = %config.storage_path, "storage initialized");

    let app_state = Arc::new(AppState::new(DbRepository::new(db_pool.clone())));
    let app = app(app_state, &config.http_server);

    let addr = config.http_server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "starting server");

    let grace = Duration::from_secs(config.http_server.shutdown_timeout_secs);
    let outcome = serve_with_grace(listener, app, shutdown::shutdown_signal(), grace).await?;

    release_storage(db_pool, outcome).await;
    Ok(())
}

/// How the server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight request finished within the grace period.
    Drained,
    /// The grace period ran out with requests still running.
    Forced,
}

/// Closes the pool after a clean drain. After a forced stop, the pool is dropped
/// instead, because `close` waits for connections still held by abandoned
/// requests.
pub async fn release_storage(pool: SqlitePool, outcome: ShutdownOutcome) {
    match outcome {
        ShutdownOutcome::Drained => pool.close().await,
        ShutdownOutcome::Forced => {
            tracing::warn!(connections = pool.size(), "dropping storage pool without waiting for open connections");
        }
    }
}

/// Serves `app` until `signal` resolves, then stops accepting connections and
/// gives in-flight requests up to `grace` to finish.
///
/// On `Forced`, connection tasks still running are left to the runtime; the
/// caller must return promptly so they are dropped with it.
pub async fn serve_with_grace<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> anyhow::Result<ShutdownOutcome>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        _ = signal => {}
        result = &mut server => {
            // The server ended on its own, which only happens on an I/O error.
            result??;
            return Ok(ShutdownOutcome::Drained);
        }
    }

    tracing::info!("shutting down server...");
    let _ = stop_tx.send(());

    let outcome = match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            result??;
            ShutdownOutcome::Drained
        }
        Err(_) => {
            tracing::warn!(grace_ms = grace.as_millis() as u64, "in-flight requests did not finish in time, forcing shutdown");
            server.abort();
            ShutdownOutcome::Forced
        }
    };

    tracing::info!(?outcome, "server stopped");
    Ok(outcome)
}
