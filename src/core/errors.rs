use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Datastore(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized => write!(f, "Cannot signin"),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Datastore(msg) => write!(f, "Datastore fault: {}", msg),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // The underlying cause never reaches the caller; datastore faults
        // only surface in the log.
        let body = match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Unauthorized => "Cannot signin".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Datastore(msg) => {
                tracing::error!("datastore fault: {}", msg);
                "request failed".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": body }))
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Datastore(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Datastore(err.to_string())
    }
}
