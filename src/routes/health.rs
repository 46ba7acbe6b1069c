use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let ping = sqlx::query("SELECT 1").execute(&state.pool);
    let database = match tokio::time::timeout(Duration::from_secs(2), ping).await {
        Ok(Ok(_)) => "up",
        Ok(Err(e)) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            "down"
        }
        Err(_) => "down",
    };

    let body = json!({
        "success": true,
        "status": "ok",
        "database": database,
    });
    (StatusCode::OK, Json(body))
}
