//! Finding the configured wallpaper file for a display.
//!
//! Each platform keeps this setting somewhere different: gsettings keys,
//! xfconf properties, plasma and pcmanfm config files, System Events on
//! macOS. Anything we don't know about goes through the `wallpaper` crate,
//! which only reports the primary display's picture.

#[cfg(all(unix, not(target_os = "macos")))]
mod linux;
#[cfg(target_os = "macos")]
mod macos;

use std::path::PathBuf;

use url::Url;

use crate::config::Config;
use crate::display::Display;
use crate::error::{Result, WallpaperError};

/// Resolves the wallpaper file configured for `display`.
///
/// `displays` is the current display list, used by backends that address
/// desktops by position. Read-only: nothing here changes any setting.
pub fn wallpaper_path(display: &Display, displays: &[Display], config: &Config) -> Result<PathBuf> {
    let location = platform_lookup(display, displays, config)?;
    let location = location.trim();

    if location.is_empty() {
        return Err(WallpaperError::NotConfigured(display.id));
    }

    let path = to_local_path(location)?;
    log::info!("display {} wallpaper: {}", display.id, path.display());
    Ok(path)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_lookup(display: &Display, displays: &[Display], config: &Config) -> Result<String> {
    let desktop = config.desktop_environment();
    log::debug!("looking up wallpaper for desktop environment '{}'", desktop);

    match linux::lookup(desktop, display, displays, config) {
        Some(result) => result,
        None => lookup_with_wallpaper_crate(display),
    }
}

#[cfg(target_os = "macos")]
fn platform_lookup(display: &Display, _displays: &[Display], _config: &Config) -> Result<String> {
    match macos::lookup(display) {
        Ok(location) => Ok(location),
        Err(e) if display.primary => {
            log::debug!("System Events lookup failed ({}), trying Finder", e);
            lookup_with_wallpaper_crate(display)
        }
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn platform_lookup(display: &Display, _displays: &[Display], _config: &Config) -> Result<String> {
    lookup_with_wallpaper_crate(display)
}

/// The `wallpaper` crate knows a single desktop-wide picture.
fn lookup_with_wallpaper_crate(display: &Display) -> Result<String> {
    log::debug!("falling back to the desktop-wide picture for display {}", display.id);
    wallpaper::get().map_err(|e| WallpaperError::command("wallpaper", e.to_string()))
}

/// Accepts either a plain path or a `file://` URI.
pub(crate) fn to_local_path(location: &str) -> Result<PathBuf> {
    if location.starts_with("file:") {
        let url = Url::parse(location).map_err(|_| WallpaperError::InvalidUri(location.to_string()))?;
        return url
            .to_file_path()
            .map_err(|_| WallpaperError::InvalidUri(location.to_string()));
    }

    if location.contains("://") {
        return Err(WallpaperError::InvalidUri(location.to_string()));
    }

    Ok(PathBuf::from(location))
}
