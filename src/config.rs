use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TsgwCfg {
    #[serde(default)]
    pub http: HttpCfg,
    #[serde(default)]
    pub influx: InfluxCfg,
    #[serde(default)]
    pub auth: AuthCfg,
    #[serde(default)]
    pub health: HealthCfg,
    #[serde(default)]
    pub shutdown: ShutdownCfg,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct HttpCfg {
    pub bind: SocketAddr,
    pub max_body_bytes: usize,
}
impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct InfluxCfg {
    pub url: String,
    pub token: String,
    pub timeout_ms: u64,
}
impl Default for InfluxCfg {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".into(),
            token: String::new(),
            timeout_ms: 10_000,
        }
    }
}

/// The single user allowed to write through the gateway.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields, default)]
pub struct AuthCfg {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct HealthCfg {
    pub require_influx: bool,
    pub check_interval_ms: u64,
}
impl Default for HealthCfg {
    fn default() -> Self {
        Self {
            require_influx: false,
            check_interval_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, default)]
pub struct ShutdownCfg {
    /// Time between reporting not-ready and closing the listener.
    pub grace_ms: u64,
    /// Upper bound on draining in-flight requests.
    pub drain_timeout_ms: u64,
}
impl Default for ShutdownCfg {
    fn default() -> Self {
        Self {
            grace_ms: 0,
            drain_timeout_ms: 5000,
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 888)
}

impl TsgwCfg {
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        Self::from_builder(build_config(path)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.influx.url.as_str();
        anyhow::ensure!(
            url.starts_with("http://") || url.starts_with("https://"),
            "influx.url must be an http(s) URL, got {url:?}"
        );
        reqwest::Url::parse(url)
            .map_err(|e| anyhow::anyhow!("influx.url {url:?}: {e}"))?;
        anyhow::ensure!(self.influx.timeout_ms > 0, "influx.timeout_ms must be positive");
        anyhow::ensure!(self.http.max_body_bytes > 0, "http.max_body_bytes must be positive");
        anyhow::ensure!(
            self.health.check_interval_ms > 0,
            "health.check_interval_ms must be positive"
        );
        Ok(())
    }

    fn from_builder(cfg: config::Config) -> anyhow::Result<Self> {
        Ok(cfg.try_deserialize()?)
    }
}

fn build_config(path: Option<&str>) -> anyhow::Result<config::Config> {
    use config::{Config, Environment, File};
    let mut builder = Config::builder()
        .add_source(File::with_name("tsgw").required(false));
    if let Some(path) = path {
        builder = builder.add_source(File::with_name(path));
    }
    builder = builder.add_source(
        Environment::with_prefix("TSGW")
            .prefix_separator("__")
            .separator("__"),
    );
    Ok(builder.build()?)
}
