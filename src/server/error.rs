use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::utils::error::LeaderboardError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Invalid access code")]
    Unauthorized,

    #[error("Failed to parse CSV.")]
    UnprocessableRoster(#[source] LeaderboardError),

    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: LeaderboardError,
    },
}

impl ApiError {
    /// `map_err` adapter tagging a store failure with the message shown to clients.
    pub fn internal(message: &'static str) -> impl FnOnce(LeaderboardError) -> Self {
        move |source| Self::Internal { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::UnprocessableRoster(source) => {
                tracing::warn!("Rejected roster upload: {}", source);
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Internal { message, source } => {
                tracing::error!("{}: {} (category: {:?})", message, source, source.category());
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
