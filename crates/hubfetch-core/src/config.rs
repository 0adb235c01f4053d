use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::manifest::DEFAULT_MIRROR;

/// Transport settings for the asset download (optional `[download]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Seconds allowed for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Abort the transfer when it stays below 1 KiB/s for this many seconds.
    pub stall_timeout_secs: u64,
    /// Optional cap on a whole request in seconds (None = no cap).
    pub timeout_secs: Option<u64>,
    /// Maximum number of 301/302 hops followed before giving up.
    pub max_redirects: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            stall_timeout_secs: 60,
            timeout_secs: None,
            max_redirects: 5,
        }
    }
}

/// How repositories are cloned (optional `[clone]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneConfig {
    /// Version-control executable, looked up on `PATH` when not absolute.
    pub program: String,
    /// History depth passed as `--depth`.
    pub depth: u32,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            depth: 1,
        }
    }
}

/// Global configuration, optionally loaded from `~/.config/hubfetch/config.toml`.
///
/// The resource list itself is built in; only the mirror, the target root and
/// transport knobs can be changed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubfetchConfig {
    /// Base URL of the model hub mirror every built-in URL is derived from.
    pub mirror: String,
    /// Target root override (None = `models/` next to the executable).
    pub models_dir: Option<PathBuf>,
    pub download: DownloadConfig,
    pub clone: CloneConfig,
}

impl Default for HubfetchConfig {
    fn default() -> Self {
        Self {
            mirror: DEFAULT_MIRROR.to_string(),
            models_dir: None,
            download: DownloadConfig::default(),
            clone: CloneConfig::default(),
        }
    }
}

/// Location of an existing user config file, if there is one.
pub fn find_config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hubfetch")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Parse a config file at `path`. The file must exist.
pub fn load_from_path(path: &Path) -> Result<HubfetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: HubfetchConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Load `explicit` if given, else the XDG config file if present, else defaults.
/// Never writes a file.
pub fn load(explicit: Option<&Path>) -> Result<HubfetchConfig> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    match find_config_path()? {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            load_from_path(&path)
        }
        None => Ok(HubfetchConfig::default()),
    }
}
