use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{
    handlers::{dashboard, instruments, live_quote, select_instrument},
    AppState,
};

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/instruments", get(instruments))
        .route("/instrument", post(select_instrument))
        .route("/dashboard", get(dashboard))
        .route("/quote/{code}", get(live_quote));

    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", api_routes)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
