use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Serialize;

use crate::application::CommerceError;

// ============================================================================
// Error Responses
// ============================================================================
//
// {"success": false, "error": {"code": "INSUFFICIENT_STOCK", "message": "..."}}
//
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

pub fn error_body(code: &'static str, message: impl Into<String>) -> ErrorBody {
    ErrorBody {
        success: false,
        error: ErrorDetail {
            code,
            message: message.into(),
        },
    }
}

pub fn status_for(error: &CommerceError) -> StatusCode {
    match error {
        CommerceError::ProductNotFound(_)
        | CommerceError::OrderNotFound(_)
        | CommerceError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
        CommerceError::InsufficientStock { .. }
        | CommerceError::OrderNotMutable { .. }
        | CommerceError::OrderCannotBeCancelled { .. }
        | CommerceError::InvalidStatusTransition { .. }
        | CommerceError::DuplicateSku(_) => StatusCode::CONFLICT,
        CommerceError::InvalidMoney(_)
        | CommerceError::InvalidSku(_)
        | CommerceError::InvalidOrderStatus(_)
        | CommerceError::InvalidQuantity(_)
        | CommerceError::EmptyOrder
        | CommerceError::Validation(_) => StatusCode::BAD_REQUEST,
        CommerceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handler error type; renders a `CommerceError` as the JSON envelope.
#[derive(Debug)]
pub struct ApiError(pub CommerceError);

impl From<CommerceError> for ApiError {
    fn from(error: CommerceError) -> Self {
        ApiError(error)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(&self.0)
    }

    fn error_response(&self) -> HttpResponse {
        // Storage details stay in the logs
        let message = match &self.0 {
            CommerceError::Storage(_) => "Internal storage error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(error_body(self.0.code(), message))
    }
}

pub type ApiResult = Result<HttpResponse, ApiError>;

// ============================================================================
// Extractor error handlers
// ============================================================================

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(error_body("VALIDATION_ERROR", err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(error_body("VALIDATION_ERROR", err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(error_body("VALIDATION_ERROR", err.to_string()));
        InternalError::from_response(err, response).into()
    })
}
