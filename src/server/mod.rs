//! HTTP API over the participant and fixed-ranking stores.
//!
//! | method | path                         | auth |
//! |--------|------------------------------|------|
//! | GET    | `/health`                    |      |
//! | GET    | `/api/leaderboard`           |      |
//! | POST   | `/api/leaderboard`           | yes  |
//! | GET    | `/api/leaderboard/ranked`    |      |
//! | POST   | `/api/upload`                | yes  |
//! | GET    | `/api/fixed-rankings`        |      |
//! | POST   | `/api/fixed-rankings`        | yes  |
//! | DELETE | `/api/fixed-rankings?email=` | yes  |
//!
//! "auth" routes require the `X-Access-Code` header when `[admin].access_code` is set.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod error;
pub mod routes;

use crate::config::AppConfig;
use crate::core::repository::LeaderboardRepository;
use crate::utils::error::Result;
use routes::{
    delete_fixed_ranking_handler, get_fixed_rankings_handler, get_leaderboard_handler,
    health_handler, post_fixed_rankings_handler, post_leaderboard_handler, ranked_handler,
    upload_handler, ACCESS_CODE_HEADER,
};

/// Process-scoped state handed to every handler.
pub struct AppState {
    pub repository: LeaderboardRepository,
    pub access_code: Option<String>,
}

impl AppState {
    pub fn new(repository: LeaderboardRepository, access_code: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            repository,
            access_code,
        })
    }
}

pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/leaderboard",
            get(get_leaderboard_handler).post(post_leaderboard_handler),
        )
        .route("/api/leaderboard/ranked", get(ranked_handler))
        .route("/api/upload", axum::routing::post(upload_handler))
        .route(
            "/api/fixed-rankings",
            get(get_fixed_rankings_handler)
                .post(post_fixed_rankings_handler)
                .delete(delete_fixed_ranking_handler),
        )
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ACCESS_CODE_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    if origins.is_empty() {
        return layer.allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| warn!("Ignoring invalid CORS origin {origin}: {e}"))
                .ok()
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

pub async fn serve(config: &AppConfig, repository: LeaderboardRepository) -> Result<()> {
    info!(
        "Initializing state with {} store...",
        repository.backend()
    );
    let state = AppState::new(repository, config.admin.access_code.clone());
    if state.access_code.is_none() {
        warn!("No admin access code configured; write routes are open");
    }

    let app = router(state, &config.server.cors_origins);

    let address = format!("{}:{}", config.server.bind, config.server.port);
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
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
}
