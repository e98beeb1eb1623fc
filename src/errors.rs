use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e {
            DomainError::UserNotFound(_)
            | DomainError::OrderNotFound(_)
            | DomainError::OrderItemNotFound(_)
            | DomainError::ProductNotFound(_) => AppError::NotFound(message),
            DomainError::EmptyOrder
            | DomainError::CreditExhausted { .. }
            | DomainError::InvalidCredit(_)
            | DomainError::InvalidItemStatus { .. } => AppError::BadRequest(message),
            DomainError::DuplicateUser { .. } => AppError::Conflict(message),
            DomainError::Forbidden => AppError::Forbidden(message),
            DomainError::Internal(_) => AppError::Internal(message),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Do not leak internals to callers.
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}
