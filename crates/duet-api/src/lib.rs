pub mod clock;
pub mod error;
pub mod extract;
pub mod generate;
pub mod middleware;
pub mod pairs;
pub mod state;
pub mod today;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner, AuthConfig};

/// All routes of the service. Layers such as CORS and tracing are added by
/// the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/generate", post(generate::generate))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/api/pairs", post(pairs::create_pair))
        .route("/api/pairs/join", post(pairs::join_pair))
        .route("/api/pairs/current", get(pairs::current_pair))
        .route("/api/pairs/{pair_id}", get(pairs::get_pair))
        .route("/api/pairs/{pair_id}/today", get(today::today_view))
        .route("/api/pairs/{pair_id}/today/prompt", post(today::generate_today_prompt))
        .route("/api/pairs/{pair_id}/today/response", post(today::submit_response))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
