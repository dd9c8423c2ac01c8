#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// A running `tsgw` child and the address it reported on stdout.
pub struct Gateway {
    pub child: Child,
    pub addr: String,
}

impl Gateway {
    pub fn spawn(dir: &Path, config: &str) -> Self {
        std::fs::write(dir.join("tsgw.toml"), config).unwrap();

        let mut cmd = Command::cargo_bin("tsgw").unwrap();
        cmd.current_dir(dir)
            .env_remove("RUST_LOG") // keep output predictable
            .env_remove("TSGW_TOKEN")
            .env_remove("TSGW_PASS")
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().expect("failed to spawn tsgw");
        let stdout = child.stdout.take().expect("no stdout captured");
        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        let start = Instant::now();
        let addr = loop {
            line.clear();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                if start.elapsed() > Duration::from_secs(5) {
                    let _ = child.kill();
                    panic!("timed out waiting for 'listening on …'");
                }
                std::thread::sleep(Duration::from_millis(20));
                continue;
            }
            if let Some(rest) = line.trim().strip_prefix("listening on ") {
                break rest.to_string();
            }
            if start.elapsed() > Duration::from_secs(5) {
                let _ = child.kill();
                panic!("did not see 'listening on …'; last line: {line}");
            }
        };

        Self { child, addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
