use std::net::SocketAddr;

use clap::Parser;

use crate::config::TsgwCfg;

/// Forwards authenticated JSON writes to InfluxDB.
///
/// Flags override `TSGW__*` environment variables, which override the
/// config file.
#[derive(Parser, Debug, Default)]
#[command(name = "tsgw", version)]
pub struct Cli {
    /// Config file to load on top of ./tsgw.toml.
    #[arg(long)]
    pub config: Option<String>,

    /// Address to listen on.
    #[arg(long)]
    pub http_bind: Option<SocketAddr>,

    /// Port to listen on; keeps the bind address' IP.
    #[arg(long)]
    pub port: Option<u16>,

    /// InfluxDB URL.
    #[arg(long)]
    pub url: Option<String>,

    /// InfluxDB token.
    #[arg(long, env = "TSGW_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API user.
    #[arg(long)]
    pub user: Option<String>,

    /// API password.
    #[arg(long, env = "TSGW_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Print the effective bind address and exit.
    #[arg(long)]
    pub print_bind: bool,
}

impl Cli {
    pub fn apply(&self, cfg: &mut TsgwCfg) {
        if let Some(bind) = self.http_bind {
            cfg.http.bind = bind;
        }
        if let Some(port) = self.port {
            cfg.http.bind.set_port(port);
        }
        if let Some(url) = &self.url {
            cfg.influx.url = url.clone();
        }
        if let Some(token) = &self.token {
            cfg.influx.token = token.clone();
        }
        if let Some(user) = &self.user {
            cfg.auth.user = user.clone();
        }
        if let Some(pass) = &self.pass {
            cfg.auth.pass = pass.clone();
        }
    }
}
