use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use directories::BaseDirs;
use regex::Regex;

use crate::command;
use crate::config::Config;
use crate::desktop::DesktopEnvironment;
use crate::display::Display;
use crate::error::{Result, WallpaperError};

/// Returns `None` for desktops this module has no reader for.
pub(super) fn lookup(
    desktop: DesktopEnvironment,
    display: &Display,
    displays: &[Display],
    config: &Config,
) -> Option<Result<String>> {
    let index = display.index_in(displays).unwrap_or(0);

    let result = match desktop {
        DesktopEnvironment::Gnome => gnome(config),
        DesktopEnvironment::Cinnamon => gsettings_string("org.cinnamon.desktop.background", "picture-uri"),
        DesktopEnvironment::Mate => gsettings_string("org.mate.background", "picture-filename"),
        DesktopEnvironment::Xfce => xfce(display, index),
        DesktopEnvironment::Kde => kde(display, displays),
        DesktopEnvironment::Lxde => lxde(index),
        DesktopEnvironment::Unknown => return None,
    };
    Some(result)
}

fn gsettings_string(schema: &str, key: &str) -> Result<String> {
    let raw = command::output("gsettings", &["get", schema, key])?;
    Ok(parse_gsettings_string(&raw))
}

/// GNOME shares one picture across all displays, with a separate one for the
/// dark style.
fn gnome(config: &Config) -> Result<String> {
    let dark = match config.prefer_dark {
        Some(dark) => dark,
        None => gsettings_string("org.gnome.desktop.interface", "color-scheme")
            .map(|scheme| scheme == "prefer-dark")
            .unwrap_or(false),
    };

    if dark {
        // picture-uri-dark only exists since GNOME 42
        match gsettings_string("org.gnome.desktop.background", "picture-uri-dark") {
            Ok(uri) if !uri.is_empty() => return Ok(uri),
            Ok(_) => {}
            Err(e) => log::debug!("no dark wallpaper key: {}", e),
        }
    }

    gsettings_string("org.gnome.desktop.background", "picture-uri")
}

fn xfce(display: &Display, index: usize) -> Result<String> {
    let listing = command::output("xfconf-query", &["-c", "xfce4-desktop", "-l"])?;
    let properties = parse_xfconf_image_properties(&listing);

    let property = select_xfconf_property(&properties, display.name.as_deref(), index)
        .ok_or(WallpaperError::NotConfigured(display.id))?;

    command::output("xfconf-query", &["-c", "xfce4-desktop", "-p", &property.path])
}

fn kde(display: &Display, displays: &[Display]) -> Result<String> {
    let path = user_config_dir()?.join("plasma-org.kde.plasma.desktop-appletsrc");
    let content = fs::read_to_string(&path).map_err(|e| WallpaperError::io(&path, e))?;

    let image = plasma_image_for_display(&content, display, displays).unwrap_or_default();
    let image_path = super::to_local_path(&image)?;

    // Plasma also accepts wallpaper packages, directories holding one image
    // per resolution.
    if image_path.is_dir() {
        return Ok(largest_package_image(&image_path)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default());
    }

    Ok(image)
}

fn lxde(index: usize) -> Result<String> {
    let path = user_config_dir()?
        .join("pcmanfm")
        .join("LXDE")
        .join(format!("desktop-items-{}.conf", index));
    let content = fs::read_to_string(&path).map_err(|e| WallpaperError::io(&path, e))?;
    Ok(parse_pcmanfm_wallpaper(&content).unwrap_or_default())
}

fn user_config_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| WallpaperError::Unsupported("no home directory".to_string()))
}

/// Unquotes a gsettings string value such as `'file:///a/b.jpg'`.
pub(crate) fn parse_gsettings_string(raw: &str) -> String {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(raw);
    inner.replace("\\'", "'").replace("\\\\", "\\")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XfconfProperty {
    pub path: String,
    pub monitor: String,
    /// `None` for the pre-4.12 `image-path` layout.
    pub workspace: Option<u32>,
}

fn xfconf_last_image() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/backdrop/screen\d+/monitor([^/]+)/(?:workspace(\d+)/last-image|image-path)$")
            .expect("xfconf pattern is valid")
    })
}

pub(crate) fn parse_xfconf_image_properties(listing: &str) -> Vec<XfconfProperty> {
    listing
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let caps = xfconf_last_image().captures(line)?;
            Some(XfconfProperty {
                path: line.to_string(),
                monitor: caps[1].to_string(),
                workspace: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            })
        })
        .collect()
}

/// Picks the property for a monitor, matched by connector name first and by
/// position second. Workspace 0 wins over other workspaces.
pub(crate) fn select_xfconf_property(
    properties: &[XfconfProperty],
    name: Option<&str>,
    index: usize,
) -> Option<XfconfProperty> {
    let index = index.to_string();
    let by_name = |p: &&XfconfProperty| name.is_some_and(|n| p.monitor == n);
    let by_index = |p: &&XfconfProperty| p.monitor == index;
    let rank = |p: &&XfconfProperty| p.workspace.unwrap_or(0);

    properties
        .iter()
        .filter(by_name)
        .min_by_key(rank)
        .or_else(|| properties.iter().filter(by_index).min_by_key(rank))
        .cloned()
}

fn plasma_section() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[Containments\]\[(\d+)\](.*)$").expect("plasma section pattern is valid")
    })
}

#[derive(Debug, Default)]
struct Containment {
    last_screen: Option<usize>,
    image: Option<String>,
}

/// Plasma numbers screens with the primary one as 0, whatever position it
/// has in the xrandr listing.
pub(crate) fn plasma_image_for_display(
    appletsrc: &str,
    display: &Display,
    displays: &[Display],
) -> Option<String> {
    let screen = display.primary_first_index_in(displays)?;
    plasma_image_for_screen(appletsrc, screen)
}

/// Reads the wallpaper image of the desktop containment on `screen` from
/// `plasma-org.kde.plasma.desktop-appletsrc`.
pub(crate) fn plasma_image_for_screen(appletsrc: &str, screen: usize) -> Option<String> {
    let mut containments: BTreeMap<u32, Containment> = BTreeMap::new();
    let mut current: Option<(u32, String)> = None;

    for line in appletsrc.lines().map(str::trim) {
        if line.starts_with('[') {
            current = plasma_section()
                .captures(line)
                .and_then(|caps| Some((caps[1].parse().ok()?, caps[2].to_string())));
            continue;
        }

        let Some((id, rest)) = &current else { continue };
        let Some((key, value)) = line.split_once('=') else { continue };
        let entry = containments.entry(*id).or_default();

        match (rest.as_str(), key.trim()) {
            ("", "lastScreen") => entry.last_screen = value.trim().parse().ok(),
            ("[Wallpaper][org.kde.image][General]", "Image") => {
                entry.image = Some(value.trim().to_string())
            }
            _ => {}
        }
    }

    containments
        .into_values()
        .filter(|c| c.last_screen == Some(screen))
        .find_map(|c| c.image)
}

fn package_resolution() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)x(\d+)\.").expect("resolution pattern is valid"))
}

/// Picks the highest resolution image from a wallpaper package directory
/// (`contents/images/<W>x<H>.<ext>`).
fn largest_package_image(package: &Path) -> Option<PathBuf> {
    let images = package.join("contents").join("images");
    let entries = fs::read_dir(&images).ok()?;

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .max_by_key(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| package_resolution().captures(n))
                .and_then(|caps| {
                    let w: u64 = caps[1].parse().ok()?;
                    let h: u64 = caps[2].parse().ok()?;
                    w.checked_mul(h)
                })
                .unwrap_or(0)
        })
}

pub(crate) fn parse_pcmanfm_wallpaper(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .find(|(key, _)| key.trim() == "wallpaper")
        .map(|(_, value)| value.trim().to_string())
}
