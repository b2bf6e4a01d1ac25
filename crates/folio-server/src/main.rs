mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header::CONTENT_TYPE};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use folio_api::middleware::ADMIN_KEY_HEADER;
use folio_api::moderation::Moderation;
use folio_api::rate_limit::{self, FixedWindowLimiter};
use folio_db::Database;

use crate::config::ServerConfig;

/// How often elapsed rate-limit windows are dropped.
const LIMITER_SWEEP_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "folio=debug,folio_api=debug,folio_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = ServerConfig::from_env()?;

    if config.moderation.admin_key.is_none() {
        warn!("FOLIO_ADMIN_KEY is not set; admin routes will answer 500 until it is");
    }
    if config.moderation.uses_default_salt() {
        warn!("FOLIO_IP_HASH_SALT is not set; falling back to the built-in default salt");
    }

    if config.moderation.trust_proxy {
        info!("Rate limiting on the last X-Forwarded-For hop (one trusted proxy)");
    } else {
        info!("Rate limiting on the TCP peer address");
    }

    // Init database
    std::fs::create_dir_all(&config.data_dir)?;
    let db = Database::open(&config.db_path())?;

    let limiter = Arc::new(FixedWindowLimiter::for_submissions());
    tokio::spawn(rate_limit::run_sweep_loop(limiter.clone(), LIMITER_SWEEP_SECS));

    let state = Arc::new(Moderation::new(db, config.moderation.clone(), limiter));

    let mut app = Router::new()
        .nest("/api", folio_api::router(state))
        .layer(TraceLayer::new_for_http());

    // Dev CORS: allow the front-end dev server to call /api
    if !config.production {
        let origin: HeaderValue = config.dev_client_origin.parse()?;
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, HeaderName::from_static(ADMIN_KEY_HEADER)])
            .allow_credentials(false);
        app = app.layer(cors);
        info!("CORS enabled for {}", config.dev_client_origin);
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Folio server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
