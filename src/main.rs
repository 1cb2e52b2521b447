use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fleet_backend::config::EnvironmentConfig;
use fleet_backend::database;
use fleet_backend::repositories::Repositories;
use fleet_backend::routes::create_router;
use fleet_backend::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚚 Fleet backend ({})", config.environment);

    let pool = match database::connect(config.require_database_url()?).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Database connection failed: {}", e);
            return Err(e);
        }
    };

    if config.rotate_refresh_tokens {
        info!("🔄 Refresh token rotation enabled");
    }
    if config.is_production() && !config.cookie_secure {
        warn!("⚠️  COOKIE_SECURE is off in production");
    }

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_router(AppState::new(config, Repositories::postgres(pool.clone())));

    info!("🌐 Server listening on http://{}", addr);
    info!("🔍 Endpoints:");
    info!("   GET    /health");
    info!("   POST   /auth/register | /auth/login | /auth/refresh | /auth/logout");
    info!("   GET    /users | POST /users");
    info!("   GET    /users/:id | PATCH /users/:id | DELETE /users/:id");
    info!("   GET    /vehicles?page=&pageSize=&q=");
    info!("   GET    /vehicles/:id | /vehicles/:id/status?date=YYYY-MM-DD");
    info!("   GET    /reports/trips.xlsx?from=YYYY-MM-DD&to=YYYY-MM-DD");

    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Server error: {}", e);
                e
            })
    });

    if let Err(e) = server_handle.await? {
        error!("❌ Server stopped with error: {}", e);
    }

    pool.close().await;
    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 SIGTERM received, shutting down...");
        },
    }
}
