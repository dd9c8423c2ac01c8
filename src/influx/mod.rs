//! InfluxDB v2 HTTP write client.

pub mod line_protocol;

use std::time::Duration;

use axum::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::config::InfluxCfg;
use crate::domain::Point;
use crate::sink::{PointSink, SinkError, WriteTarget};

#[derive(Debug, Clone)]
pub struct InfluxSink {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl InfluxSink {
    pub fn new(cfg: &InfluxCfg) -> Result<Self, SinkError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.url.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
        })
    }

    /// `GET /health`; any 2xx counts as up.
    pub async fn ping(&self) -> Result<(), SinkError> {
        let res = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        check(res).await
    }

    fn with_token(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.is_empty() {
            req
        } else {
            req.header(AUTHORIZATION, format!("Token {}", self.token))
        }
    }
}

#[async_trait]
impl PointSink for InfluxSink {
    async fn write(&self, target: &WriteTarget, point: &Point) -> Result<(), SinkError> {
        let body = line_protocol::encode(point)?;
        tracing::debug!(line = %body, "encoded point");

        let req = self
            .http
            .post(format!("{}/api/v2/write", self.base_url))
            .query(&[
                ("org", target.org.as_str()),
                ("bucket", target.bucket.as_str()),
                ("precision", "s"),
            ])
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body);

        let res = self.with_token(req).send().await?;
        check(res).await
    }
}

async fn check(res: reqwest::Response) -> Result<(), SinkError> {
    let status = res.status();
    if status.is_success() {
        return Ok(());
    }
    let body = res.text().await.unwrap_or_default();
    Err(SinkError::Rejected { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::Router;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};
    use time::OffsetDateTime;

    #[derive(Debug, Clone)]
    struct Seen {
        query: HashMap<String, String>,
        auth: Option<String>,
        body: String,
    }

    type Log = Arc<Mutex<Vec<Seen>>>;

    async fn record(
        State(log): State<Log>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
        body: String,
    ) -> StatusCode {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        log.lock().unwrap().push(Seen { query, auth, body });
        StatusCode::NO_CONTENT
    }

    async fn refuse() -> (StatusCode, &'static str) {
        (StatusCode::NOT_FOUND, r#"{"code":"not found","message":"bucket not found"}"#)
    }

    async fn stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn cfg(url: String, token: &str) -> InfluxCfg {
        InfluxCfg {
            url,
            token: token.into(),
            timeout_ms: 2000,
        }
    }

    fn target() -> WriteTarget {
        WriteTarget {
            org: "acme".into(),
            bucket: "sensors".into(),
        }
    }

    fn sample_point() -> Point {
        Point {
            measurement: "temp".into(),
            tags: BTreeMap::from([("room".to_string(), "lab".to_string())]),
            fields: BTreeMap::from([("c".to_string(), FieldValue::Float(21.5))]),
            time: OffsetDateTime::from_unix_timestamp(1700000000).unwrap(),
        }
    }

    #[tokio::test]
    async fn writes_line_protocol_with_token() {
        let log = Log::default();
        let url = stub(
            Router::new()
                .route("/api/v2/write", post(record))
                .with_state(log.clone()),
        )
        .await;

        let sink = InfluxSink::new(&cfg(format!("{url}/"), "s3cret")).unwrap();
        sink.write(&target(), &sample_point()).await.unwrap();

        let seen = log.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].query["org"], "acme");
        assert_eq!(seen[0].query["bucket"], "sensors");
        assert_eq!(seen[0].query["precision"], "s");
        assert_eq!(seen[0].auth.as_deref(), Some("Token s3cret"));
        assert_eq!(seen[0].body, "temp,room=lab c=21.5 1700000000");
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let log = Log::default();
        let url = stub(
            Router::new()
                .route("/api/v2/write", post(record))
                .with_state(log.clone()),
        )
        .await;

        let sink = InfluxSink::new(&cfg(url, "")).unwrap();
        sink.write(&target(), &sample_point()).await.unwrap();

        assert_eq!(log.lock().unwrap()[0].auth, None);
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let router = Router::new().route("/api/v2/write", post(refuse));
        let url = stub(router).await;

        let sink = InfluxSink::new(&cfg(url, "t")).unwrap();
        let err = sink.write(&target(), &sample_point()).await.unwrap_err();

        match err {
            SinkError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert!(body.contains("bucket not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unencodable_point_never_reaches_the_database() {
        let log = Log::default();
        let url = stub(
            Router::new()
                .route("/api/v2/write", post(record))
                .with_state(log.clone()),
        )
        .await;

        let mut point = sample_point();
        point.fields.clear();
        let sink = InfluxSink::new(&cfg(url, "t")).unwrap();

        assert!(matches!(
            sink.write(&target(), &point).await,
            Err(SinkError::Encode(_))
        ));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ping_reports_health() {
        let up = Router::new().route("/health", get(|| async { "pass" }));
        let sink = InfluxSink::new(&cfg(stub(up).await, "")).unwrap();
        assert!(sink.ping().await.is_ok());

        let sink = InfluxSink::new(&cfg(stub(Router::new()).await, "")).unwrap();
        assert!(sink.ping().await.is_err());
    }
}
