use axum::body::Bytes;
use axum::extract::{Path, State};
use time::OffsetDateTime;

use crate::app::AppState;
use crate::domain::WriteRequest;
use crate::ingest::IngestError;
use crate::metrics;
use crate::sink::WriteTarget;

/// `POST /<org>/<bucket>`. Authentication has already happened in the
/// route layer; the body is parsed here so that a bad body is a 400 rather
/// than an extractor rejection.
pub async fn write(
    State(st): State<AppState>,
    Path((org, bucket)): Path<(String, String)>,
    body: Bytes,
) -> Result<&'static str, IngestError> {
    let received_at = OffsetDateTime::now_utc();
    tracing::debug!(payload = %String::from_utf8_lossy(&body), "received payload");

    let req: WriteRequest = serde_json::from_slice(&body)?;
    tracing::info!(%org, %bucket, measurement = %req.measurement, "received data");

    let point = req.into_point(received_at)?;
    let target = WriteTarget { org, bucket };

    let timer = metrics::WRITE_DURATION.start_timer();
    st.sink.write(&target, &point).await?;
    timer.observe_duration();

    metrics::POINTS_WRITTEN.inc();
    metrics::request("ok");
    tracing::debug!(measurement = %point.measurement, "wrote point");
    Ok("OK")
}
