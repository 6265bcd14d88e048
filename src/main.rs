use dotenvy::dotenv;
use rollcall::logging::init_tracing;
use rollcall::metrics::{init_metrics, metrics_app};
use rollcall::router::init_router;
use rollcall::state::AppState;
use rollcall_config::ServerConfig;
use rollcall_core::set_expose_internal_errors;
use rollcall_db::{init_db_pool, run_migrations};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let server_config = ServerConfig::from_env();
    set_expose_internal_errors(server_config.is_development());

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            error!("DATABASE_URL must be set");
            std::process::exit(1);
        }
    };

    let db = match init_db_pool(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&db).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let state = AppState::from_env(db);
    let mut app = init_router(state);

    if let Some(handle) = init_metrics() {
        app = app.merge(metrics_app(handle));
        info!("Prometheus metrics available at /metrics");
    }

    let addr = match server_config.bind_address() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, host = %server_config.host, "Invalid HOST/PORT");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(%addr, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Scalar UI available at http://{}/scalar", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }

    info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
