//! Mapping of service errors onto HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use derive_more::{Display, From};
use tictactoe_engine::MoveError;
use tracing::{error, warn};

use crate::api::dto::ErrorBody;
use crate::service::ServiceError;

/// Error returned by HTTP handlers.
#[derive(Debug, Display, From)]
pub enum ApiError {
    /// Failure reported by the game service.
    #[from]
    #[display("{}", _0)]
    Service(ServiceError),

    /// The `gameId` parameter is not an integer, so no game can match it.
    #[display("Game {} was not found", _0)]
    MalformedId(String),

    /// The query string is missing a parameter or does not deserialize.
    #[from]
    #[display("{}", _0)]
    InvalidQuery(QueryRejection),

    /// The JSON body is missing, malformed or does not fit the request type.
    #[from]
    #[display("{}", _0)]
    InvalidBody(JsonRejection),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedId(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidQuery(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::Move(MoveError::CorruptHistory(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ServiceError::Move(_) | ServiceError::ConcurrentConflict { .. } => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::GameNotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::Storage(_) | ServiceError::Worker { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %message, "Request rejected");
        } else {
            error!(status = status.as_u16(), error = %message, "Request failed");
        }

        let body = ErrorBody {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
