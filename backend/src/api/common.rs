//! Error handling and pagination utilities for API responses.
//!
//! Provides structured error responses and conversion between service-layer
//! errors and HTTP responses. Includes:
//! - Standard error response format
//! - ServiceError to HTTP status code mapping
//! - A JSON body extractor whose rejections use the same error format
//! - Lenient page/limit parsing and the paginated list envelope
//!
//! # Response Format
//! All errors return consistent JSON responses containing:
//! - `message`: Human-readable message
//! - `code`: Machine-readable error category
//! - `details`: Optional field-specific validation errors
//!
//! Paginated responses are `{ items, total, page, pages }`.

use crate::errors::{FieldError, ServiceError};
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub message: String,
    /// Machine-readable error type identifier
    pub code: String,
    /// Field-specific validation errors when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Rejection type used by handlers and middleware
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
    details: Option<Vec<FieldError>>,
) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
            code: code.to_string(),
            details,
        }),
    )
}

/// 400 response for malformed path or query input
pub fn validation_error_response(message: impl Into<String>) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, "validation_error", message, None)
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    match error {
        ServiceError::Validation { message, fields } => {
            let details = if fields.is_empty() { None } else { Some(fields) };
            error_response(StatusCode::BAD_REQUEST, "validation_error", message, details)
        }
        ServiceError::NotFound { entity, identifier } => {
            tracing::debug!("{} {} not found", entity, identifier);
            error_response(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} not found", entity),
                None,
            )
        }
        ServiceError::AlreadyExists { entity, identifier } => error_response(
            StatusCode::CONFLICT,
            "already_exists",
            format!("{} '{}' already exists", entity, identifier),
            None,
        ),
        ServiceError::Unauthorized { message } => {
            tracing::warn!("Rejected request: {}", message);
            error_response(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized", None)
        }
        ServiceError::PermissionDenied { message } => {
            error_response(StatusCode::FORBIDDEN, "forbidden", message, None)
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {:#}", source);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "Internal server error",
                None,
            )
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
                None,
            )
        }
    }
}

/// Parses a numeric path id. Anything that is not an integer cannot name an
/// existing row, so it is reported as `404` for `entity`.
pub fn parse_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| service_error_to_http(ServiceError::not_found(entity, raw)))
}

/// JSON body extractor that reports malformed bodies as `400` validation errors.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection_to_http(rejection)),
        }
    }
}

fn json_rejection_to_http(rejection: JsonRejection) -> ApiError {
    let code = match rejection {
        JsonRejection::MissingJsonContentType(_) => "unsupported_media_type",
        _ => "invalid_body",
    };
    error_response(StatusCode::BAD_REQUEST, code, rejection.body_text(), None)
}

/// Page/limit pair, parsed leniently from query strings.
///
/// Malformed values fall back to their defaults instead of being rejected,
/// so `?page=abc` behaves like no page at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 100;

    pub fn from_query(page: Option<&str>, limit: Option<&str>, default_limit: u32) -> Self {
        let page = page
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|p| p.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or(1);

        let limit = match limit.and_then(|raw| raw.trim().parse::<i64>().ok()) {
            Some(0) | None => default_limit,
            Some(l) => l.clamp(1, Self::MAX_LIMIT as i64) as u32,
        };

        Self { page, limit }
    }

    /// Calculate offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// Get limit for database queries
    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

/// Raw `page` / `limit` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn pagination(&self, default_limit: u32) -> Pagination {
        Pagination::from_query(self.page.as_deref(), self.limit.as_deref(), default_limit)
    }
}

/// Paginated list envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            pages: total.div_ceil(pagination.limit as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamping() {
        assert_eq!(
            Pagination::from_query(None, None, 10),
            Pagination { page: 1, limit: 10 }
        );
        assert_eq!(
            Pagination::from_query(Some("3"), Some("500"), 10),
            Pagination { page: 3, limit: 100 }
        );
        assert_eq!(
            Pagination::from_query(Some("-4"), Some("-2"), 10),
            Pagination { page: 1, limit: 1 }
        );
    }

    #[test]
    fn test_pagination_malformed_input_falls_back() {
        let pagination = Pagination::from_query(Some("abc"), Some("ten"), 20);
        assert_eq!(pagination, Pagination { page: 1, limit: 20 });

        let zero = Pagination::from_query(Some("0"), Some("0"), 10);
        assert_eq!(zero, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_pagination_offset() {
        let pagination = Pagination { page: 3, limit: 25 };
        assert_eq!(pagination.offset(), 50);
        assert_eq!(pagination.limit(), 25);
    }

    #[test]
    fn test_page_count_rounds_up() {
        let pagination = Pagination { page: 1, limit: 10 };
        assert_eq!(Page::new(vec![1, 2, 3], 25, pagination).pages, 3);
        assert_eq!(Page::<i32>::new(vec![], 0, pagination).pages, 0);
        assert_eq!(Page::new(vec![1], 10, pagination).pages, 1);
    }

    #[test]
    fn test_service_error_status_mapping() {
        let cases = [
            (ServiceError::validation("bad"), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("Event", 9), StatusCode::NOT_FOUND),
            (ServiceError::already_exists("User", "a@b.c"), StatusCode::CONFLICT),
            (ServiceError::unauthorized("no token"), StatusCode::UNAUTHORIZED),
            (ServiceError::permission_denied("nope"), StatusCode::FORBIDDEN),
            (
                ServiceError::internal_error("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let (status, _) = service_error_to_http(error);
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_unauthorized_body_hides_reason() {
        let (_, Json(body)) =
            service_error_to_http(ServiceError::unauthorized("Token validation failed: expired"));
        assert_eq!(body.message, "Unauthorized");
        assert_eq!(body.code, "unauthorized");
    }
}
