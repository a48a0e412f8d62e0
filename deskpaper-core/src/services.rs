// Service traits and default implementations for dependency injection
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::decode::{decode_file, WallpaperImage};
use crate::display::{connected_displays, Display};
use crate::error::Result;
use crate::lookup;

/// Service trait for display enumeration
pub trait DisplayService {
    /// Displays connected right now
    fn displays(&self) -> Result<Vec<Display>>;
}

/// Service trait for wallpaper lookups
pub trait WallpaperService {
    /// Path of the wallpaper configured for `display`
    fn wallpaper_path(&self, display: &Display, displays: &[Display]) -> Result<PathBuf>;
}

/// Service trait for turning a file into a bitmap
pub trait ImageService {
    fn load_image(&self, path: &Path) -> Result<WallpaperImage>;
}

/// Combined service provider for dependency injection
pub trait ServiceProvider: DisplayService + WallpaperService + ImageService {}

impl<T: DisplayService + WallpaperService + ImageService> ServiceProvider for T {}

/// Reads the running system's settings
#[derive(Debug, Clone, Default)]
pub struct DefaultServiceProvider {
    config: Config,
}

impl DefaultServiceProvider {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Uses the user's config file, falling back to defaults when it can't be
    /// read.
    pub fn from_user_config() -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            log::warn!("{:#}, using default settings", e);
            Config::default()
        });
        Self::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl DisplayService for DefaultServiceProvider {
    fn displays(&self) -> Result<Vec<Display>> {
        connected_displays()
    }
}

impl WallpaperService for DefaultServiceProvider {
    fn wallpaper_path(&self, display: &Display, displays: &[Display]) -> Result<PathBuf> {
        lookup::wallpaper_path(display, displays, &self.config)
    }
}

impl ImageService for DefaultServiceProvider {
    fn load_image(&self, path: &Path) -> Result<WallpaperImage> {
        decode_file(path, self.config.decode_limits())
    }
}
