use std::sync::Arc;

use crate::config::TsgwCfg;
use crate::readiness::Readiness;
use crate::sink::PointSink;

/// Everything a request needs. Built once at startup and never mutated; the
/// readiness flags are the only interior state and they are atomics.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<TsgwCfg>,
    pub ready: Arc<Readiness>,
    pub sink: Arc<dyn PointSink>,
}

impl AppState {
    pub fn new(cfg: TsgwCfg, sink: Arc<dyn PointSink>) -> Self {
        Self {
            cfg: Arc::new(cfg),
            ready: Arc::new(Readiness::new()),
            sink,
        }
    }
}
