use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use crate::decode::WallpaperImage;
use crate::display::{primary_of, Display, DisplayId};
use crate::error::{Result, WallpaperError};
use crate::services::{DefaultServiceProvider, ServiceProvider};

/// Retrieves the current desktop picture as a decoded bitmap.
///
/// Every call is independent: nothing is cached and no state is shared
/// between calls, so one accessor can serve any number of threads.
pub struct WallpaperAccessor<S = DefaultServiceProvider> {
    services: Arc<S>,
}

impl<S> Clone for WallpaperAccessor<S> {
    fn clone(&self) -> Self {
        Self {
            services: Arc::clone(&self.services),
        }
    }
}

impl WallpaperAccessor<DefaultServiceProvider> {
    /// Accessor over the running system, configured from the user's config
    /// file.
    pub fn system() -> Self {
        Self::with_services(DefaultServiceProvider::from_user_config())
    }
}

impl<S: ServiceProvider> WallpaperAccessor<S> {
    pub fn with_services(services: S) -> Self {
        Self::from_arc(Arc::new(services))
    }

    pub fn from_arc(services: Arc<S>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    pub fn displays(&self) -> Result<Vec<Display>> {
        self.services.displays()
    }

    /// The primary display's wallpaper, read and decoded on this thread.
    ///
    /// `None` covers every failure: no wallpaper configured, unreadable file,
    /// undecodable image.
    pub fn primary(&self) -> Option<WallpaperImage> {
        absent_on_error(self.try_primary())
    }

    pub fn try_primary(&self) -> Result<WallpaperImage> {
        primary_pipeline(self.services.as_ref())
    }

    /// Blocking lookup for a specific display.
    pub fn try_for_display(&self, id: DisplayId) -> Result<WallpaperImage> {
        display_pipeline(self.services.as_ref(), id)
    }
}

impl<S: ServiceProvider + Send + Sync + 'static> WallpaperAccessor<S> {
    /// Looks up `id`'s wallpaper on a background thread and hands the result
    /// to `completion`.
    ///
    /// Returns immediately. `completion` runs exactly once, on whichever
    /// thread finishes the work, with `None` when the display is not
    /// connected or the lookup fails in any way. There is no way to cancel
    /// a request once made.
    pub fn for_display<F>(&self, id: DisplayId, completion: F)
    where
        F: FnOnce(Option<WallpaperImage>) + Send + 'static,
    {
        let services = Arc::clone(&self.services);
        let completion = Completion::new(completion);

        let spawned = thread::Builder::new()
            .name(format!("deskpaper-lookup-{}", id))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    display_pipeline(services.as_ref(), id)
                }))
                .unwrap_or_else(|_| {
                    Err(WallpaperError::Worker(format!(
                        "lookup for display {} panicked",
                        id
                    )))
                });
                completion.complete(absent_on_error(result));
            });

        // The closure, and the completion inside it, is dropped on failure,
        // which reports an absent result from here.
        if let Err(e) = spawned {
            log::warn!("failed to spawn lookup thread for display {}: {}", id, e);
        }
    }

    /// Same as [`for_display`](Self::for_display), delivering through a
    /// channel that yields exactly one value.
    pub fn for_display_channel(&self, id: DisplayId) -> Receiver<Option<WallpaperImage>> {
        let (tx, rx) = mpsc::sync_channel(1);
        self.for_display(id, move |image| {
            // The receiver may already be gone, nobody is waiting then.
            let _ = tx.send(image);
        });
        rx
    }
}

fn primary_pipeline<S: ServiceProvider + ?Sized>(services: &S) -> Result<WallpaperImage> {
    let displays = services.displays()?;
    let display = primary_of(&displays)
        .ok_or_else(|| WallpaperError::Unsupported("no displays connected".to_string()))?;

    let path = services.wallpaper_path(display, &displays)?;
    services.load_image(&path)
}

fn display_pipeline<S: ServiceProvider + ?Sized>(services: &S, id: DisplayId) -> Result<WallpaperImage> {
    let displays = services.displays()?;
    let display = displays
        .iter()
        .find(|d| d.id == id)
        .ok_or(WallpaperError::DisplayNotConnected(id))?;

    let path = services.wallpaper_path(display, &displays)?;
    services.load_image(&path)
}

fn absent_on_error(result: Result<WallpaperImage>) -> Option<WallpaperImage> {
    match result {
        Ok(image) => Some(image),
        Err(e) => {
            log::debug!("wallpaper unavailable: {}", e);
            None
        }
    }
}

/// Single-shot callback holder. If it is dropped without being completed
/// the callback still runs, with `None`.
struct Completion<F>
where
    F: FnOnce(Option<WallpaperImage>),
{
    callback: Option<F>,
}

impl<F> Completion<F>
where
    F: FnOnce(Option<WallpaperImage>),
{
    fn new(callback: F) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    fn complete(mut self, image: Option<WallpaperImage>) {
        if let Some(callback) = self.callback.take() {
            callback(image);
        }
    }
}

impl<F> Drop for Completion<F>
where
    F: FnOnce(Option<WallpaperImage>),
{
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_completion_runs_once_when_completed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let completion = Completion::new(move |image: Option<WallpaperImage>| {
            assert!(image.is_none());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        completion.complete(None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_completion_reports_absent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let completion = Completion::new(move |image: Option<WallpaperImage>| {
            assert!(image.is_none());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        drop(completion);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
