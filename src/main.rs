use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tsgw::app::AppState;
use tsgw::cli::Cli;
use tsgw::config::TsgwCfg;
use tsgw::http;
use tsgw::influx::InfluxSink;
use tsgw::readiness::start_influx_health_check;
use tsgw::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut cfg = TsgwCfg::load(cli.config.as_deref())?;
    cli.apply(&mut cfg);
    cfg.validate()?;

    if cli.print_bind {
        println!("{}", cfg.http.bind);
        return Ok(());
    }

    tracing::info!(influx_url = %cfg.influx.url, bind = %cfg.http.bind, "starting");

    let influx = InfluxSink::new(&cfg.influx)?;
    let state = AppState::new(cfg, Arc::new(influx.clone()));
    if state.cfg.health.require_influx {
        start_influx_health_check(
            influx,
            state.ready.clone(),
            Duration::from_millis(state.cfg.health.check_interval_ms),
        );
    }

    let listener = TcpListener::bind(state.cfg.http.bind).await?;
    println!("listening on {}", listener.local_addr()?);

    http::serve(listener, state, shutdown_signal()).await
}
