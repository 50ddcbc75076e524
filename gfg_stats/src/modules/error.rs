use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gfg_stats_libs::{api::ErrorResponse, FetchError};
use thiserror::Error;

/// Everything a handler can fail with. Converted into a JSON [`ErrorResponse`] at the router
/// boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{error}: {message}")]
    Validation {
        error: &'static str,
        message: String,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },
    #[error("upstream failure")]
    Upstream(#[source] FetchError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::NotFound(_) => ApiError::NotFound(String::from("Profile not found")),
            e => ApiError::Upstream(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, message) = match &self {
            ApiError::Validation { error, message } => (*error, message.clone()),
            ApiError::NotFound(message) => ("Not Found", message.clone()),
            ApiError::RateLimited { .. } => (
                "Too many requests",
                String::from("Rate limit exceeded. Please try again in a minute."),
            ),
            ApiError::Upstream(e) => {
                tracing::error!("request failed cause: {:?}", e);
                (
                    "Internal Server Error",
                    String::from("An unexpected error occurred. Please try again later."),
                )
            }
        };

        let body = Json(ErrorResponse::new(error, message, status.as_u16()));
        let mut response = (status, body).into_response();
        if let ApiError::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
        }

        response
    }
}
