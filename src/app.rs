use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/api/user", post(handlers::set_user))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/config", get(handlers::get_config).put(handlers::update_config))
        .with_state(state)
}
