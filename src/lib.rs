//! Authenticated HTTP gateway that forwards JSON writes to InfluxDB as
//! single points.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod domain;
pub mod http;
pub mod influx;
pub mod ingest;
pub mod metrics;
pub mod readiness;
pub mod shutdown;
pub mod sink;
