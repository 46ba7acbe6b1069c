use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Map, Value as JsonValue};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) | Error::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Config(_)
            | Error::Database(_)
            | Error::Migration(_)
            | Error::Password(_)
            | Error::Internal(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let mut body = Map::new();
        body.insert("success".into(), JsonValue::Bool(false));

        match &self {
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg) => {
                tracing::debug!(status = %status, "{}", msg);
                body.insert("message".into(), json!(msg));
            }
            Error::Validation(errors) => {
                tracing::debug!(status = %status, "validation failed: {}", errors);
                body.insert("message".into(), json!("Missing or invalid fields."));
                body.insert("errors".into(), field_errors_json(errors));
            }
            Error::Json(err) => {
                body.insert("message".into(), json!(format!("Malformed JSON: {}", err)));
            }
            Error::Multipart(err) => {
                body.insert("message".into(), json!(format!("Malformed upload: {}", err)));
            }
            _ => {
                tracing::error!(error = ?self, "request failed");
                body.insert("message".into(), json!("Server error"));
                body.insert("error".into(), json!(self.to_string()));
                if crate::config::development_mode() {
                    body.insert("stack".into(), json!(format!("{:?}", self)));
                }
            }
        }

        (status, Json(JsonValue::Object(body))).into_response()
    }
}

/// Field errors keyed by the camelCase names clients send.
fn field_errors_json(errors: &validator::ValidationErrors) -> JsonValue {
    let fields: Map<String, JsonValue> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (camel_case(&field), json!(errs)))
        .collect();
    JsonValue::Object(fields)
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let message = match db.constraint() {
                    Some(name) if name.starts_with("users_") => "User already exists.",
                    Some(name) if name.starts_with("customers_") => "Customer already exists.",
                    _ => "Record already exists.",
                };
                Error::Conflict(message.to_string())
            }
            other => Error::Database(other),
        }
    }
}

/// Fallback for requests that match no route.
pub async fn unhandled_route() -> Error {
    Error::NotFound("Not Found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: Error) -> (StatusCode, JsonValue) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_render_message_envelope() {
        let (status, body) = render(Error::Conflict("User already exists.".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "User already exists.");
        assert!(body.get("error").is_none());

        let (status, _) = render(Error::NotFound("User not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = render(Error::Unauthorized("Invalid email or password.".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn server_errors_attach_raw_message() {
        let (status, body) = render(Error::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Server error");
        assert!(body["error"].as_str().unwrap().contains("pool timed out"));
    }

    #[test]
    fn field_names_are_camel_cased() {
        assert_eq!(camel_case("last_name"), "lastName");
        assert_eq!(camel_case("is_available"), "isAvailable");
        assert_eq!(camel_case("email"), "email");
    }

    #[tokio::test]
    async fn validation_errors_use_client_field_names() {
        use validator::Validate;

        let errors = crate::dto::customer_dto::RegisterCustomerPayload::default()
            .validate()
            .unwrap_err();
        let (status, body) = render(Error::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["firstName"].is_array());
        assert!(body["errors"].get("first_name").is_none());
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unhandled_route_is_generic_not_found() {
        let (status, body) = render(unhandled_route().await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Not Found");
    }
}
