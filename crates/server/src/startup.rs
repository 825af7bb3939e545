use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::notification::LogNotifier;
use service::token::JwtTokenService;
use service::user::{StoredUserRepository, UserService};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// CORS policy admitting exactly the configured origin.
pub fn build_cors(allowed_origin: &str) -> Result<CorsLayer, StartupError> {
    let origin = HeaderValue::from_str(allowed_origin)
        .map_err(|e| StartupError::InvalidConfig(format!("cors.allowed_origin: {e}")))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::LOCATION]))
}

/// Wire the production collaborators from configuration.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    let repo = if cfg.storage.users_path.trim().is_empty() {
        StoredUserRepository::in_memory()
    } else {
        let path = PathBuf::from(&cfg.storage.users_path);
        StoredUserRepository::open(&path)
            .await
            .map_err(|e| StartupError::InvalidConfig(format!("storage.users_path {}: {e}", path.display())))?
    };
    let users = UserService::new(Arc::new(repo));
    let tokens = JwtTokenService::new(
        &cfg.auth.jwt_secret,
        cfg.auth.issuer.clone(),
        Duration::from_secs(cfg.auth.token_ttl_secs),
    );
    let notifier = LogNotifier::new(cfg.notification.sender.clone());

    Ok(AppState::new(
        Arc::new(users),
        Arc::new(tokens),
        Arc::new(notifier),
        Duration::from_millis(cfg.notification.send_timeout_ms),
    ))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let cors = build_cors(&cfg.cors.allowed_origin)?;
    let app: Router = routes::build_router(state, cors);

    let addr = bind_addr(&cfg)?;
    info!(%addr, origin = %cfg.cors.allowed_origin, "starting blog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
