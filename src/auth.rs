//! HTTP basic authentication against the single configured user.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::app::AppState;
use crate::config::AuthCfg;
use crate::ingest::IngestError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    /// Extracts `Authorization: Basic ...`. `None` when the header is
    /// missing, uses another scheme, or does not decode to `user:pass`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        Self::parse(value)
    }

    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, pass) = decoded.split_once(':')?;
        Some(Self {
            user: user.to_string(),
            pass: pass.to_string(),
        })
    }

    pub fn matches(&self, expected: &AuthCfg) -> bool {
        self.user == expected.user && self.pass == expected.pass
    }
}

/// Middleware for the write routes. Runs before the body is read.
pub async fn require_basic_auth(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, IngestError> {
    match Credentials::from_headers(req.headers()) {
        Some(creds) if creds.matches(&st.cfg.auth) => Ok(next.run(req).await),
        _ => Err(IngestError::Unauthorized),
    }
}
