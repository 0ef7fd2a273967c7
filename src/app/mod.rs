//! Application layer: routes and handlers

pub mod health;
pub mod users;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::core::middleware::request_logging_middleware;
use users::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
}

impl AppState {
    pub fn new(user_service: UserService) -> Self {
        Self { user_service }
    }
}

/// Build the full HTTP surface
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(users::handler::list_users).post(users::handler::create_user),
        )
        .route(
            "/api/users/:uuid",
            get(users::handler::get_user)
                .put(users::handler::update_user)
                .delete(users::handler::delete_user),
        )
        .route("/health", get(health::health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_logging_middleware)),
        )
        .with_state(state)
}
