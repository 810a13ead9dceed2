use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use log::error;
use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::handlers::orders::Envelope;

pub const NOT_AUTHORIZED: &str = "Not Authorized Login Again";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Failures reported to HTTP callers as `{success: false, message}`.
///
/// Business rejections travel inside a 200 envelope; only credential and
/// transport problems use the HTTP status line.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{}", NOT_AUTHORIZED)]
    Unauthorized,

    #[error("Order not found")]
    NotFound,

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            e @ (DomainError::InvalidStatus(_) | DomainError::InvalidInput(_)) => {
                AppError::Rejected(e.to_string())
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound | AppError::Rejected(_) => StatusCode::OK,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                error!("Request failed: {detail}");
                INTERNAL_SERVER_ERROR.to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(Envelope::failure(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;
    use actix_web::ResponseError;

    fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = resp.into_body().try_into_bytes().expect("buffered body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn unauthorized_returns_401_with_login_message() {
        let resp = AppError::Unauthorized.error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], NOT_AUTHORIZED);
    }

    #[test]
    fn not_found_is_a_business_failure_inside_200() {
        let resp = AppError::NotFound.error_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Order not found");
    }

    #[test]
    fn internal_error_hides_detail() {
        let resp = AppError::Internal("connection refused on 10.0.0.3".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp);
        assert_eq!(body["message"], INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_not_found_maps_to_app_not_found() {
        let app_err: AppError = DomainError::NotFound.into();
        assert!(matches!(app_err, AppError::NotFound));
    }

    #[test]
    fn domain_invalid_status_maps_to_rejection_with_message() {
        let app_err: AppError = DomainError::InvalidStatus("Lost".to_string()).into();
        assert_eq!(app_err.to_string(), "Invalid order status: Lost");
        assert_eq!(app_err.status_code(), StatusCode::OK);
    }

    #[test]
    fn domain_internal_maps_to_app_internal() {
        let app_err: AppError = DomainError::Internal("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::BadRequest("Json deserialize error".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
