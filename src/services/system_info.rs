//! Host uptime and hostname lookups

use anyhow::{Context, Result};
use log::debug;
use std::{
    env,
    path::{Path, PathBuf},
};
use tokio::fs;

pub const DEFAULT_UPTIME_PATH: &str = "/proc/uptime";
pub const DEFAULT_HOSTNAME_PATH: &str = "/etc/hostname";

#[derive(Clone, Debug)]
pub struct SystemInfoService {
    uptime_path: PathBuf,
    hostname_path: PathBuf,
}

impl Default for SystemInfoService {
    fn default() -> Self {
        Self::new(DEFAULT_UPTIME_PATH, DEFAULT_HOSTNAME_PATH)
    }
}

impl SystemInfoService {
    pub fn new(uptime_path: impl Into<PathBuf>, hostname_path: impl Into<PathBuf>) -> Self {
        Self {
            uptime_path: uptime_path.into(),
            hostname_path: hostname_path.into(),
        }
    }

    /// Uptime formatted as `{days}d {hours}h {minutes}m {seconds}s`
    pub async fn uptime(&self) -> Result<String> {
        let contents = fs::read_to_string(&self.uptime_path)
            .await
            .context(format!("failed to read {:?}", self.uptime_path))?;

        let secs = contents
            .split_whitespace()
            .next()
            .context("failed to parse uptime: empty counter")?
            .parse::<f64>()
            .context("failed to parse uptime")?;

        let uptime = format_uptime(secs);
        debug!("system uptime: {uptime}");
        Ok(uptime)
    }

    /// Hostname from the environment, else the hostname file. None if neither is set.
    pub async fn hostname(&self) -> Option<String> {
        resolve_hostname(env::var("HOSTNAME").ok(), &self.hostname_path).await
    }
}

pub fn format_uptime(secs: f64) -> String {
    // fractional seconds are dropped
    let secs = secs.max(0.0) as u64;

    let (days, rest) = (secs / 86_400, secs % 86_400);
    let (hours, rest) = (rest / 3_600, rest % 3_600);
    let (minutes, seconds) = (rest / 60, rest % 60);

    format!("{days}d {hours}h {minutes}m {seconds}s")
}

async fn resolve_hostname(from_env: Option<String>, hostname_file: &Path) -> Option<String> {
    if let Some(hostname) = from_env.filter(|hostname| !hostname.is_empty()) {
        return Some(hostname);
    }

    fs::read_to_string(hostname_file)
        .await
        .ok()
        .map(|contents| contents.trim().to_string())
        .filter(|hostname| !hostname.is_empty())
}
