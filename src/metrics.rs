use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let requests = IntCounterVec::new(
        Opts::new("tsgw_requests_total", "Write requests by outcome"),
        &["outcome"],
    )
    .expect("valid metric definition");

    REGISTRY
        .register(Box::new(requests.clone()))
        .expect("metric registered once");
    requests
});

pub static POINTS_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    let points_written = IntCounter::new(
        "tsgw_points_written_total",
        "Points accepted by the database",
    )
    .expect("valid metric definition");

    REGISTRY
        .register(Box::new(points_written.clone()))
        .expect("metric registered once");
    points_written
});

pub static WRITE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    let write_duration = Histogram::with_opts(HistogramOpts::new(
        "tsgw_write_duration_seconds",
        "Latency of database writes",
    ))
    .expect("valid metric definition");

    REGISTRY
        .register(Box::new(write_duration.clone()))
        .expect("metric registered once");
    write_duration
});

/// Registers every metric so they show up before the first request.
pub fn init() {
    Lazy::force(&REQUESTS);
    Lazy::force(&POINTS_WRITTEN);
    Lazy::force(&WRITE_DURATION);
}

pub fn request(outcome: &str) {
    REQUESTS.with_label_values(&[outcome]).inc();
}

pub fn render() -> Result<String, prometheus::Error> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_registered_metrics() {
        init();
        request("ok");

        let text = render().unwrap();
        assert!(text.contains("tsgw_requests_total{outcome=\"ok\"}"));
        assert!(text.contains("tsgw_points_written_total"));
        assert!(text.contains("tsgw_write_duration_seconds_bucket"));
    }
}
