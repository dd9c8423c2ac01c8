use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::HealthCfg;
use crate::influx::InfluxSink;

pub struct Readiness {
    draining: AtomicBool,
    influx_ok: AtomicBool,
}

impl Readiness {
    pub fn new() -> Self {
        Self {
            draining: AtomicBool::new(false),
            influx_ok: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self, cfg: &HealthCfg) -> bool {
        if self.draining.load(Ordering::Relaxed) {
            return false;
        }
        !cfg.require_influx || self.influx_ok.load(Ordering::Relaxed)
    }

    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    pub fn set_influx_ok(&self, ok: bool) {
        self.influx_ok.store(ok, Ordering::Relaxed);
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Pings the database on an interval and records the result. Only
/// transitions are logged.
pub fn start_influx_health_check(
    sink: InfluxSink,
    ready: Arc<Readiness>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = None;
        loop {
            let ok = match sink.ping().await {
                Ok(()) => true,
                Err(e) => {
                    if last != Some(false) {
                        tracing::warn!(error = %e, "influx health check failed");
                    }
                    false
                }
            };
            if ok && last != Some(true) {
                tracing::info!("influx reachable");
            }
            ready.set_influx_ok(ok);
            last = Some(ok);
            tokio::time::sleep(interval).await;
        }
    })
}
