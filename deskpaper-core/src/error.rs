use std::path::PathBuf;

use thiserror::Error;

use crate::display::DisplayId;

/// Every way a wallpaper lookup can fail.
///
/// The plain accessors collapse all of these into an absent result; the
/// `try_*` variants hand them back to callers that want to tell them apart.
#[derive(Debug, Error)]
pub enum WallpaperError {
    #[error("display {0} is not connected")]
    DisplayNotConnected(DisplayId),

    #[error("no wallpaper is configured for display {0}")]
    NotConfigured(DisplayId),

    #[error("wallpaper lookup is not supported here: {0}")]
    Unsupported(String),

    #[error("`{program}` failed: {message}")]
    Command { program: String, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("decoded image {0} has no pixels")]
    EmptyImage(PathBuf),

    #[error("not a local file URI: {0}")]
    InvalidUri(String),

    #[error("lookup worker failed: {0}")]
    Worker(String),
}

impl WallpaperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn command(program: &str, message: impl Into<String>) -> Self {
        Self::Command {
            program: program.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WallpaperError>;
