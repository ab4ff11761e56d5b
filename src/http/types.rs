use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::error::Error;

/// Header carrying the opaque session token.
pub const SESSION_HEADER: &str = "x-session-token";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Boundary wrapper turning a domain failure into a status + JSON body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ConflictOnReorder => StatusCode::CONFLICT,
            Error::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(ErrorBody { message: "internal error".into() }),
                )
                    .into_response();
            }
        };
        (status, axum::Json(ErrorBody { message: self.0.to_string() })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Pulls the session token out of the request headers.
pub fn session_token(headers: &HeaderMap) -> ApiResult<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError(Error::Unauthorized))
}
