use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crud_users::app::users::service::UserService;
use crud_users::infrastructure::database::{DatabaseManager, MySqlUserRepository};
use crud_users::infrastructure::event_log::FileEventLog;
use crud_users::infrastructure::logger::Logger;
use crud_users::{router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    Logger::init(&config.logging.level);

    let events = FileEventLog::open(&config.logging).with_context(|| {
        format!("failed to open event log {}", config.logging.log_file().display())
    })?;
    info!("event log: {}", events.path().display());

    let database = DatabaseManager::new(&config.database);
    let repository = MySqlUserRepository::new(database.get_pool().clone());
    let user_service = UserService::new(Arc::new(repository), Arc::new(events));

    if let Err(e) = user_service.bootstrap().await {
        if config.database.strict_bootstrap {
            return Err(e).context("failed to create the users table");
        }
        warn!("users table not verified, serving anyway: {}", e);
    }

    let app = router(AppState::new(user_service));

    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;

    info!("server listening on http://{}", local);
    info!("health check: http://{}/health", local);
    info!("users API: http://{}/api/users", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.get_pool().close().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
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
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
