use std::future::Future;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{self, Response, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::app::AppState;
use crate::{auth, ingest, metrics};

pub fn router(state: AppState) -> Router {
    metrics::init();

    let writes = Router::new()
        .route("/:org/:bucket", post(ingest::write))
        .route("/influx/:org/:bucket", post(ingest::write))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .layer(DefaultBodyLimit::max(state.cfg.http.max_body_bytes));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(render_metrics))
        .merge(writes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &http::Request<_>| {
                    tracing::info_span!(
                      "http_request",
                      method = %req.method(),
                      path = %req.uri().path(),
                    )
                })
                .on_response(|res: &Response<_>, latency: Duration, _span: &Span| {
                    tracing::info!(
                      status = %res.status(),
                      latency_ms = %latency.as_millis(),
                      "response"
                    )
                })
                .on_failure(
                    |error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                        tracing::warn!(%error, latency_ms = %latency.as_millis(), "request_failed");
                    },
                ),
        )
        .with_state(state)
}

/// Serves until `shutdown` resolves, then reports not-ready, waits out the
/// grace period, stops accepting and drains in-flight requests for at most
/// `shutdown.drain_timeout_ms`.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state.clone());
    let grace = Duration::from_millis(state.cfg.shutdown.grace_ms);
    let drain = Duration::from_millis(state.cfg.shutdown.drain_timeout_ms);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => return Ok(res??),
        () = shutdown => {}
    }

    tracing::info!("shutting down...");
    state.ready.set_draining();
    tokio::time::sleep(grace).await;
    let _ = stop_tx.send(());

    match tokio::time::timeout(drain, &mut server).await {
        Ok(res) => res??,
        Err(_) => {
            tracing::warn!(
                drain_ms = %drain.as_millis(),
                "drain timed out, aborting in-flight requests"
            );
            server.abort();
        }
    }
    tracing::info!("stopped");
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn readyz(State(st): State<AppState>) -> impl IntoResponse {
    if st.ready.is_ready(&st.cfg.health) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

async fn render_metrics() -> impl IntoResponse {
    match metrics::render() {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
