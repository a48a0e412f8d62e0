//! Read the current desktop wallpaper as a decoded bitmap.
//!
//! ```no_run
//! if let Some(wallpaper) = deskpaper_core::primary_wallpaper() {
//!     println!("{}x{}", wallpaper.width(), wallpaper.height());
//! }
//! ```

mod accessor;
#[cfg(unix)]
mod command;
pub mod config;
pub mod decode;
pub mod desktop;
pub mod display;
pub mod error;
pub mod lookup;
pub mod services;

use std::sync::Arc;

pub use accessor::WallpaperAccessor;
pub use config::Config;
pub use decode::WallpaperImage;
pub use desktop::DesktopEnvironment;
pub use display::{Display, DisplayId};
pub use error::WallpaperError;
pub use services::{
    DefaultServiceProvider, DisplayService, ImageService, ServiceProvider, WallpaperService,
};

/// The primary display's wallpaper, or `None` if there is none or it can't
/// be read.
pub fn primary_wallpaper() -> Option<WallpaperImage> {
    primary_wallpaper_with_service(DefaultServiceProvider::from_user_config())
}

pub fn primary_wallpaper_with_service<S: ServiceProvider>(service: S) -> Option<WallpaperImage> {
    WallpaperAccessor::with_services(service).primary()
}

/// Reads `display`'s wallpaper in the background; `completion` gets the
/// result exactly once, on another thread.
pub fn wallpaper_for_display<F>(display: DisplayId, completion: F)
where
    F: FnOnce(Option<WallpaperImage>) + Send + 'static,
{
    wallpaper_for_display_with_service(
        Arc::new(DefaultServiceProvider::from_user_config()),
        display,
        completion,
    )
}

pub fn wallpaper_for_display_with_service<S, F>(service: Arc<S>, display: DisplayId, completion: F)
where
    S: ServiceProvider + Send + Sync + 'static,
    F: FnOnce(Option<WallpaperImage>) + Send + 'static,
{
    WallpaperAccessor::from_arc(service).for_display(display, completion)
}

/// Displays connected right now.
pub fn displays() -> error::Result<Vec<Display>> {
    display::connected_displays()
}
