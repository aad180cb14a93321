use crate::services::{
    config_store::DEFAULT_CONFIG_PATH, service_reload::DEFAULT_RELOAD_TIMEOUT,
    system_info::DEFAULT_UPTIME_PATH,
};
use anyhow::{Context, Result, ensure};
use std::{env, path::PathBuf, time::Duration};

/// Application configuration loaded and validated at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// UI server configuration
    pub ui: UiConfig,

    /// Persistent settings and service helpers
    pub ros3d: Ros3dConfig,

    /// Host data sources
    pub host: HostConfig,
}

#[derive(Clone, Debug)]
pub struct UiConfig {
    pub bind_address: String,
    pub port: u16,
    /// Directory whose `static/` subfolder is served at `/static`
    pub document_root: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Ros3dConfig {
    pub config_path: PathBuf,
    pub helpers_dir: Option<PathBuf>,
    pub reload_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct HostConfig {
    pub ip_binary: PathBuf,
    pub sysfs_net: PathBuf,
    pub uptime_path: PathBuf,
}

impl AppConfig {
    /// Load and validate all configuration from environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn load_from<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            ui: UiConfig::load(&var)?,
            ros3d: Ros3dConfig::load(&var)?,
            host: HostConfig::load(&var),
        })
    }
}

impl UiConfig {
    fn load(var: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_address = var("UI_BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = var("UI_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("failed to parse UI_PORT: invalid format")?;

        let document_root = var("ROS3D_DOCUMENT_ROOT")
            .unwrap_or_else(|| ".".to_string())
            .into();

        Ok(Self {
            bind_address,
            port,
            document_root,
        })
    }
}

impl Ros3dConfig {
    fn load(var: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_path = var("ROS3D_CONFIG_PATH")
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
            .into();

        let helpers_dir = match var("ROS3D_HELPERS_DIR").filter(|dir| !dir.is_empty()) {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                ensure!(dir.is_dir(), "helpers dir {dir:?} is not a directory");
                Some(dir)
            }
            None => None,
        };

        let reload_timeout = match var("SERVICE_RELOAD_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .context("failed to parse SERVICE_RELOAD_TIMEOUT_SECS: invalid format")?,
            ),
            None => DEFAULT_RELOAD_TIMEOUT,
        };

        Ok(Self {
            config_path,
            helpers_dir,
            reload_timeout,
        })
    }
}

impl HostConfig {
    fn load(var: &impl Fn(&str) -> Option<String>) -> Self {
        Self {
            ip_binary: var("IP_BINARY").unwrap_or_else(|| "ip".to_string()).into(),
            sysfs_net: var("SYSFS_NET_PATH")
                .unwrap_or_else(|| "/sys/class/net".to_string())
                .into(),
            uptime_path: var("PROC_UPTIME_PATH")
                .unwrap_or_else(|| DEFAULT_UPTIME_PATH.to_string())
                .into(),
        }
    }
}
