use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::desktop::DesktopEnvironment;

/// User settings, read from `config.json` in the project config directory.
///
/// Nothing here is ever written back; a missing file means defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Forces a desktop environment instead of detecting it.
    pub desktop: Option<String>,
    /// Read GNOME's dark-style picture. Follows `color-scheme` when unset.
    pub prefer_dark: Option<bool>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Upper bound for the decoder's allocations, in MiB.
    pub max_alloc_mb: Option<u64>,
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "deskpaper", "deskpaper")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Loads the config from the default location.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::debug!("no home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Loads a config file the user named explicitly; unlike
    /// [`load_from`](Self::load_from), a missing file is an error.
    pub fn load_required(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!("Config file {} does not exist", path.display());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn desktop_environment(&self) -> DesktopEnvironment {
        match &self.desktop {
            Some(name) => DesktopEnvironment::from_name(name),
            None => DesktopEnvironment::detect(),
        }
    }

    pub fn decode_limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        if let Some(width) = self.max_width {
            limits.max_image_width = Some(width);
        }
        if let Some(height) = self.max_height {
            limits.max_image_height = Some(height);
        }
        if let Some(mb) = self.max_alloc_mb {
            limits.max_alloc = Some(mb.saturating_mul(1024 * 1024));
        }
        limits
    }
}
