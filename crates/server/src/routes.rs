pub mod users;

use axum::{
    routing::{get, post},
    Json, Router,
};
use common::types::HEALTH_OK;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/users", tag = "users", responses((status = 200, description = "Service reachable", body = String, content_type = "text/plain")))]
pub async fn health() -> &'static str {
    HEALTH_OK
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router: the `/users` endpoints behind the CORS
/// policy, plus the OpenAPI document.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let users = Router::new()
        .route("/users", post(users::signup).get(health))
        .route("/users/login", post(users::login))
        .layer(cors);

    let docs = Router::new().route("/api-docs/openapi.json", get(openapi_json));

    users
        .merge(docs)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
