use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed request fields - message is safe to show
    Validation(String),
    /// Bad or expired one-time code
    Auth(&'static str),
    /// Action attempted outside its admission window
    WindowClosed(&'static str),
    /// Per-identity rate limit hit; carries a machine-readable retry hint
    TooSoon {
        message: &'static str,
        retry_after_ms: i64,
    },
    /// Upload payload unusable (wrong type, unreadable, over the duration cap)
    Payload(&'static str),
    NotFound(&'static str),
    /// Internal errors - logged but return generic 500 to user
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(msg) => error_body(StatusCode::BAD_REQUEST, &msg),
            AppError::Auth(msg) => error_body(StatusCode::FORBIDDEN, msg),
            AppError::WindowClosed(msg) => error_body(StatusCode::FORBIDDEN, msg),
            AppError::TooSoon {
                message,
                retry_after_ms,
            } => {
                let body = serde_json::json!({
                    "error": message,
                    "retry_after_ms": retry_after_ms,
                });
                (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
            }
            AppError::Payload(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg),
            AppError::Internal(err) => {
                tracing::error!("internal error: {:?}", err);
                sentry::capture_error(
                    err.as_ref() as &(dyn std::error::Error + Send + Sync + 'static)
                );

                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
