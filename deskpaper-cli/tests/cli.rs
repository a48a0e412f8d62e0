use std::path::{Path, PathBuf};

use clap::Parser;
use deskpaper_cli::{Cli, Command, DeskpaperCliApp};
use deskpaper_core::decode::decode_file;
use deskpaper_core::error::Result;
use deskpaper_core::{
    Display, DisplayId, DisplayService, ImageService, WallpaperAccessor, WallpaperError,
    WallpaperImage, WallpaperService,
};
use image::{Rgb, RgbImage};

struct OneScreen {
    wallpaper: Option<PathBuf>,
}

impl DisplayService for OneScreen {
    fn displays(&self) -> Result<Vec<Display>> {
        Ok(vec![Display {
            id: DisplayId(1),
            name: Some("eDP-1".to_string()),
            primary: true,
            width: Some(2560),
            height: Some(1600),
        }])
    }
}

impl WallpaperService for OneScreen {
    fn wallpaper_path(&self, display: &Display, _displays: &[Display]) -> Result<PathBuf> {
        self.wallpaper
            .clone()
            .ok_or(WallpaperError::NotConfigured(display.id))
    }
}

impl ImageService for OneScreen {
    fn load_image(&self, path: &Path) -> Result<WallpaperImage> {
        decode_file(path, image::Limits::default())
    }
}

fn app(wallpaper: Option<PathBuf>) -> DeskpaperCliApp<OneScreen> {
    DeskpaperCliApp::new(WallpaperAccessor::with_services(OneScreen { wallpaper }))
}

fn fixture(dir: &Path) -> PathBuf {
    let path = dir.join("wall.png");
    RgbImage::from_pixel(48, 27, Rgb([200u8, 100, 0]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn parses_show_with_display() {
    let cli = Cli::try_parse_from(["deskpaper", "-vv", "show", "--display", "3", "--json"]).unwrap();
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Command::Show { display, json } => {
            assert_eq!(display, Some(DisplayId(3)));
            assert!(json);
        }
        other => panic!("unexpected command {:?}", other),
    }

    assert!(Cli::try_parse_from(["deskpaper", "show", "--display", "left"]).is_err());
}

#[test]
fn lists_displays() {
    let mut out = Vec::new();
    app(None).list_displays(&mut out, false).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1* eDP-1 (2560x1600)\n");

    let mut out = Vec::new();
    app(None).list_displays(&mut out, true).unwrap();
    let listed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(listed[0]["id"], 1);
    assert_eq!(listed[0]["primary"], true);
}

#[test]
fn shows_primary_wallpaper() {
    let dir = tempfile::tempdir().unwrap();
    let wall = fixture(dir.path());

    let mut out = Vec::new();
    assert!(app(Some(wall.clone())).show(&mut out, None, false).unwrap());
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(&wall.display().to_string()));
    assert!(text.contains("Size: 48x27"));
}

#[test]
fn shows_display_wallpaper_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let wall = fixture(dir.path());

    let mut out = Vec::new();
    assert!(app(Some(wall)).show(&mut out, Some(DisplayId(1)), true).unwrap());
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["display"], 1);
    assert_eq!(report["width"], 48);
    assert_eq!(report["height"], 27);
}

#[test]
fn show_reports_absent_wallpaper() {
    let mut out = Vec::new();
    assert!(!app(None).show(&mut out, None, false).unwrap());
    assert!(!app(None).show(&mut out, Some(DisplayId(9)), false).unwrap());
    assert!(out.is_empty());
}

#[test]
fn exports_a_copy() {
    let dir = tempfile::tempdir().unwrap();
    let wall = fixture(dir.path());
    let output = dir.path().join("copy.png");

    assert!(app(Some(wall.clone())).export(&output, None).unwrap());
    let copy = image::open(&output).unwrap();
    assert_eq!((copy.width(), copy.height()), (48, 27));
}

#[test]
fn export_refuses_to_overwrite_the_wallpaper() {
    let dir = tempfile::tempdir().unwrap();
    let wall = fixture(dir.path());
    let before = std::fs::read(&wall).unwrap();

    assert!(app(Some(wall.clone())).export(&wall, None).is_err());
    assert_eq!(std::fs::read(&wall).unwrap(), before);
}
