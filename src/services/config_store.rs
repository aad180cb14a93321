//! Persistent ROS3D settings
//!
//! Flat INI file with `common` and `rest` sections. Lookups never fail and
//! fall back to caller defaults; only loading and writing report errors.

use anyhow::{Context, Result};
use ini::Ini;
use log::{debug, error, info};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/ros3d.conf";
pub const DEFAULT_REST_URL: &str = "http://localhost:8090";
pub const DEFAULT_ALADIN_MODE: &str = "READ_ONLY";

const SECTION_COMMON: &str = "common";
const SECTION_REST: &str = "rest";

/// Settings bound to a canonical file path
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    ini: Ini,
}

impl ConfigStore {
    /// Load settings from `path`, failing on I/O or syntax errors
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ini = Self::read(&path)?;

        Ok(Self { path, ini })
    }

    /// Load settings from `path`, starting empty if the file cannot be read
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let ini = Self::read(&path).unwrap_or_else(|e| {
            error!("{e:#}");
            Ini::new()
        });

        Self { path, ini }
    }

    /// Re-read the canonical path. In-memory settings are kept on failure.
    pub async fn reload(&mut self) -> Result<()> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .context(format!("failed to load configuration from {:?}", self.path))?;

        self.ini = Ini::load_from_str(&contents)
            .context(format!("failed to parse configuration {:?}", self.path))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, section: &str, key: &str, default: &str) -> String {
        match self.ini.get_from(Some(section), key) {
            Some(value) => value.to_string(),
            None => {
                debug!("failed to load {section}:{key}, returning default {default:?}");
                default.to_string()
            }
        }
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.ini.with_section(Some(section)).set(key, value.into());
    }

    /// Assigned system (rig) name, empty when unassigned
    pub fn system(&self) -> String {
        self.get(SECTION_COMMON, "system", "")
    }

    pub fn set_system(&mut self, value: Option<&str>) {
        self.set(SECTION_COMMON, "system", value.unwrap_or_default());
    }

    /// Aladin control mode
    pub fn aladin(&self) -> String {
        self.get(SECTION_COMMON, "aladin", DEFAULT_ALADIN_MODE)
    }

    pub fn set_aladin(&mut self, value: &str) {
        self.set(SECTION_COMMON, "aladin", value);
    }

    /// Device controller REST API url
    pub fn rest_url(&self) -> String {
        self.get(SECTION_REST, "url", DEFAULT_REST_URL)
    }

    /// Replace the canonical file with the current settings.
    ///
    /// Writes into a temporary file next to the target and renames it over
    /// the target, so readers never observe a partially written file.
    pub fn write(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .context(format!("failed to create temp config file in {dir:?}"))?;

        debug!("writing config to temp file: {:?}", tmp.path());

        self.ini
            .write_to(&mut tmp)
            .context("failed to write temp config file")?;

        if let Ok(metadata) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .context("failed to copy config file permissions")?;
        }

        tmp.as_file()
            .sync_all()
            .context("failed to sync temp config file")?;

        tmp.persist(&self.path)
            .context(format!("failed to replace {:?}", self.path))?;

        info!("configuration written to {:?}", self.path);

        Ok(())
    }

    fn read(path: &Path) -> Result<Ini> {
        Ini::load_from_file(path).context(format!("failed to load configuration from {path:?}"))
    }
}
