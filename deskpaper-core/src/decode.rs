use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader, Limits};

use crate::error::{Result, WallpaperError};

/// A decoded wallpaper.
///
/// Each lookup decodes a fresh copy; the caller owns it outright.
#[derive(Debug, Clone)]
pub struct WallpaperImage {
    path: PathBuf,
    image: DynamicImage,
}

impl WallpaperImage {
    pub fn new(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    /// The file the bitmap was decoded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Decodes `path`, sniffing the format from its contents rather than its
/// extension.
pub fn decode_file(path: &Path, limits: Limits) -> Result<WallpaperImage> {
    let mut reader = ImageReader::open(path)
        .map_err(|e| WallpaperError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| WallpaperError::io(path, e))?;
    reader.limits(limits);

    let image = reader.decode().map_err(|source| WallpaperError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(WallpaperError::EmptyImage(path.to_path_buf()));
    }

    log::debug!(
        "decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(WallpaperImage::new(path, image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;

    fn write_fixture(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([30u8, 60, 90]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_decode_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "wall.png", 64, 32);

        let wallpaper = decode_file(&path, Limits::default()).unwrap();
        assert_eq!(wallpaper.dimensions(), (64, 32));
        assert_eq!(wallpaper.path(), path.as_path());
    }

    #[test]
    fn test_format_is_sniffed_not_taken_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_fixture(dir.path(), "wall.png", 8, 8);
        let misnamed = dir.path().join("wall.jpg");
        fs::rename(&png, &misnamed).unwrap();

        let wallpaper = decode_file(&misnamed, Limits::default()).unwrap();
        assert_eq!(wallpaper.dimensions(), (8, 8));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_file(&dir.path().join("nope.png"), Limits::default()).unwrap_err();
        assert!(matches!(err, WallpaperError::Io { .. }));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"\x89PNG\r\n\x1a\nnot really").unwrap();

        let err = decode_file(&path, Limits::default()).unwrap_err();
        assert!(matches!(err, WallpaperError::Decode { .. }));
    }

    #[test]
    fn test_limits_are_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "big.png", 200, 10);

        let mut limits = Limits::default();
        limits.max_image_width = Some(100);
        let err = decode_file(&path, limits).unwrap_err();
        assert!(matches!(err, WallpaperError::Decode { .. }));
    }
}
