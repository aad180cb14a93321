//! Service reload
//!
//! Platform services are restarted through a helper delivered by the platform
//! integration, called with one argument per service:
//!
//! ```text
//! ros3d-ui-service-reload servo camera
//! ```
//!
//! The helper exits with 0 once the services were restarted.

#![cfg_attr(feature = "mock", allow(dead_code, unused_imports))]

use crate::config::Ros3dConfig;
use anyhow::{Context, Result, bail};
use log::{error, info, warn};
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use tokio::process::Command;
use trait_variant::make;

pub const HELPER_SCRIPT: &str = "ros3d-ui-service-reload";
pub const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Service {
    /// servo controller
    Servo,
    /// device controller
    Controller,
    /// camera controller
    Camera,
    /// platform controller
    Platform,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Servo,
        Service::Controller,
        Service::Camera,
        Service::Platform,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Servo => "servo",
            Service::Controller => "controller",
            Service::Camera => "camera",
            Service::Platform => "platform",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match Service::ALL.into_iter().find(|service| service.as_str() == name) {
            Some(service) => Ok(service),
            None => bail!("unsupported service {name:?}"),
        }
    }
}

#[make(Send)]
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait HelperInvoker {
    /// Run `helper` with `args` and return its exit code, `None` if it died from a signal
    async fn invoke(&self, helper: PathBuf, args: Vec<String>, timeout: Duration) -> Result<Option<i32>>;
}

#[derive(Clone, Debug, Default)]
pub struct ProcessInvoker;

impl HelperInvoker for ProcessInvoker {
    async fn invoke(&self, helper: PathBuf, args: Vec<String>, timeout: Duration) -> Result<Option<i32>> {
        let mut child = Command::new(&helper)
            .args(&args)
            .kill_on_drop(true)
            .spawn()
            .context(format!("failed to spawn {helper:?}"))?;

        let waited = tokio::time::timeout(timeout, child.wait()).await;

        match waited {
            Ok(status) => Ok(status.context(format!("failed to wait for {helper:?}"))?.code()),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    error!("failed to kill {helper:?}: {e:#}");
                }
                bail!("{helper:?} timed out after {}s", timeout.as_secs_f32())
            }
        }
    }
}

pub struct ServiceReloader<Invoker = ProcessInvoker>
where
    Invoker: HelperInvoker,
{
    helpers_dir: Option<PathBuf>,
    timeout: Duration,
    invoker: Invoker,
}

impl ServiceReloader<ProcessInvoker> {
    pub fn new(helpers_dir: Option<PathBuf>, timeout: Duration) -> Self {
        Self::with_invoker(helpers_dir, timeout, ProcessInvoker)
    }

    pub fn from_config(config: &Ros3dConfig) -> Self {
        if config.helpers_dir.is_none() {
            warn!("no helpers dir configured, service reload is disabled");
        }

        Self::new(config.helpers_dir.clone(), config.reload_timeout)
    }
}

impl<Invoker> ServiceReloader<Invoker>
where
    Invoker: HelperInvoker,
{
    pub fn with_invoker(helpers_dir: Option<PathBuf>, timeout: Duration, invoker: Invoker) -> Self {
        Self {
            helpers_dir,
            timeout,
            invoker,
        }
    }

    pub fn helpers_dir(&self) -> Option<&Path> {
        self.helpers_dir.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Parse service names, failing on the first unsupported one.
    /// Duplicates are dropped, first occurrence order is kept.
    pub fn check_services<S: AsRef<str>>(names: &[S]) -> Result<Vec<Service>> {
        let mut services = Vec::with_capacity(names.len());

        for name in names {
            let service: Service = name.as_ref().parse()?;
            if !services.contains(&service) {
                services.push(service);
            }
        }

        Ok(services)
    }

    /// Reload `names`.
    ///
    /// # Returns
    /// * `Err` - an unsupported service name; nothing was invoked
    /// * `Ok(false)` - reload skipped (no helper) or the helper failed
    /// * `Ok(true)` - the helper reported success
    pub async fn reload<S: AsRef<str>>(&self, names: &[S]) -> Result<bool> {
        let services = Self::check_services(names)?;

        let Some(helpers_dir) = &self.helpers_dir else {
            warn!("helpers directory not set");
            return Ok(false);
        };

        let helper = helpers_dir.join(HELPER_SCRIPT);
        if !helper.exists() {
            warn!("helper script {helper:?} does not exist");
            return Ok(false);
        }

        let args: Vec<String> = services.iter().map(ToString::to_string).collect();
        info!("reloading services: {}", args.join(" "));

        match self.invoker.invoke(helper, args, self.timeout).await {
            Ok(Some(0)) => {
                info!("services reloaded");
                Ok(true)
            }
            Ok(code) => {
                error!("service reload failed with exit code {code:?}");
                Ok(false)
            }
            Err(e) => {
                error!("service reload failed: {e:#}");
                Ok(false)
            }
        }
    }
}
