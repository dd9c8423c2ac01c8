use axum::async_trait;

use crate::domain::Point;
use crate::influx::line_protocol::EncodeError;

/// Where a point goes: the InfluxDB organisation and bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget {
    pub org: String,
    pub bucket: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("point cannot be encoded: {0}")]
    Encode(#[from] EncodeError),
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rejected with {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// A database that accepts one point per call. Implementations must not
/// retry; a failed write is reported to the caller as is.
#[async_trait]
pub trait PointSink: Send + Sync {
    async fn write(&self, target: &WriteTarget, point: &Point) -> Result<(), SinkError>;
}
