pub mod handler;

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::metrics;
use crate::sink::SinkError;

pub use handler::write;

/// Why a write request did not reach the database. Every variant is terminal
/// for the request; nothing is retried.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("missing or invalid credentials")]
    Unauthorized,
    #[error("invalid request body: {0}")]
    BadBody(#[from] serde_json::Error),
    #[error("timestamp out of range: {0}")]
    BadTimestamp(#[from] time::error::ComponentRange),
    #[error("write failed: {0}")]
    Write(#[from] SinkError),
}

impl IngestError {
    fn status(&self) -> StatusCode {
        match self {
            IngestError::Unauthorized => StatusCode::UNAUTHORIZED,
            IngestError::BadBody(_) | IngestError::BadTimestamp(_) => StatusCode::BAD_REQUEST,
            IngestError::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            IngestError::Unauthorized => "unauthorized",
            IngestError::BadBody(_) | IngestError::BadTimestamp(_) => "bad_request",
            IngestError::Write(_) => "write_failed",
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match &self {
            IngestError::Unauthorized => tracing::debug!("rejected unauthenticated write"),
            IngestError::BadBody(_) | IngestError::BadTimestamp(_) => {
                tracing::warn!(error = %self, "invalid request body")
            }
            IngestError::Write(e) => tracing::error!(error = %e, "failed to write"),
        }
        metrics::request(self.outcome());

        let status = self.status();
        if status == StatusCode::UNAUTHORIZED {
            return (status, [(WWW_AUTHENTICATE, r#"Basic realm="tsgw""#)]).into_response();
        }
        status.into_response()
    }
}
