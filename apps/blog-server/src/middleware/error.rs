//! Error handling - HTML error pages for browser-facing routes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use std::fmt;

use blog_core::error::DomainError;

use crate::middleware::auth::LOGIN_PATH;
use crate::views;

/// Application-level error type rendered as an error page.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::SEE_OTHER,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            AppError::NotFound(detail) => views::error_page(status, "Not Found", detail),
            AppError::BadRequest(detail) => views::error_page(status, "Bad Request", detail),
            AppError::Unauthorized => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, LOGIN_PATH))
                .finish(),
            AppError::Conflict(detail) => views::error_page(status, "Conflict", detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                views::error_page(
                    status,
                    "Server Error",
                    "Something went wrong on our side. Please try again later.",
                )
            }
        }
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(errors) => AppError::BadRequest(errors.to_string()),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Fallback for unmatched routes.
pub async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound(
        "The requested page does not exist.".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_not_found_maps_to_404() {
        let err = AppError::from(DomainError::not_found("Post", 7));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found: Post with id 7 not found");
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let res = AppError::Unauthorized.error_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), LOGIN_PATH);
    }

    #[actix_web::test]
    async fn test_internal_error_hides_detail() {
        let res = AppError::from(DomainError::Internal(
            "Query execution failed: syntax error at SELECT".to_string(),
        ))
        .error_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(res.into_body()).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(!html.contains("SELECT"));
    }

    #[test]
    fn test_duplicate_is_conflict() {
        let err = AppError::from(DomainError::Duplicate("username".to_string()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
