use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::records::MAX_RECORD_SIZE;
use crate::{medications, records, users};

/// All HTTP routes. Transport layers (CORS, tracing) are added by the server.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/users/me/device-token", put(users::set_device_token))
        .route(
            "/records",
            post(records::upload_record).get(records::list_records),
        )
        .route("/records/{record_id}/download", get(records::download_record))
        .route("/records/{record_id}/view", get(records::view_record))
        .route("/records/{record_id}", delete(records::delete_record))
        .route(
            "/medications",
            post(medications::create_medication).get(medications::list_medications),
        )
        .route("/medications/{medication_id}/read", post(medications::mark_medication_read))
        .route("/medications/{medication_id}/rearm", post(medications::rearm_medication))
        .layer(DefaultBodyLimit::max(MAX_RECORD_SIZE))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> &'static str {
    "ok"
}
