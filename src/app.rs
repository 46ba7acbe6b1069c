use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::error::unhandled_route;
use crate::middleware::cors::cors_layer;
use crate::routes::{customers, health, users};
use crate::utils::upload::PUBLIC_PREFIX;
use crate::AppState;

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register_user))
        .route("/login", post(users::login))
        .route("/users", get(users::list_users))
        .route("/list", get(users::list_users))
        .route("/update/:id", put(users::update_user))
        .route("/delete/:id", delete(users::delete_user))
        .route("/:id", get(users::get_user))
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(customers::register_customer))
        .route("/getcustomers", get(customers::list_customers))
        .route("/list", get(customers::list_customers))
        .route("/delete/:id", delete(customers::delete_customer))
        .route("/:id", get(customers::get_customer))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api/users", user_routes())
        .nest("/api/v1", customer_routes())
        .nest_service(PUBLIC_PREFIX, ServeDir::new(&config.uploads_dir))
        .fallback(unhandled_route)
        .with_state(state)
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
}
