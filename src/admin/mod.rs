pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends/{name}", get(get_backend))
        .route("/admin/benchmark", post(run_benchmark))
        .route("/admin/select", post(select_backend))
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
