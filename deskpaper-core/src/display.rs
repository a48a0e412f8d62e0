//! Connected displays.
//!
//! Displays belong to the operating system; this module only describes the
//! ones that are currently connected so callers have handles to pass around.

use std::fmt;
#[cfg(any(test, all(unix, not(target_os = "macos"))))]
use std::sync::OnceLock;

#[cfg(any(test, all(unix, not(target_os = "macos"))))]
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque handle for a connected monitor.
///
/// On macOS this is the CoreGraphics display id, elsewhere the monitor index
/// reported by the windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(pub u32);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    pub id: DisplayId,
    /// Connector or output name (`DP-1`, `HDMI-A-1`, ...), when known.
    pub name: Option<String>,
    pub primary: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Display {
    /// The stand-in used when the platform cannot enumerate monitors.
    pub fn fallback_primary() -> Self {
        Self {
            id: DisplayId(0),
            name: None,
            primary: true,
            width: None,
            height: None,
        }
    }

    /// Position of this display in the platform's display order, used by
    /// backends that address desktops by index.
    #[cfg(any(test, all(unix, not(target_os = "macos"))))]
    pub(crate) fn index_in(&self, displays: &[Display]) -> Option<usize> {
        displays.iter().position(|d| d.id == self.id)
    }

    /// Position counting the primary display as 0 and the rest in platform
    /// order after it.
    #[cfg(any(test, all(unix, not(target_os = "macos"))))]
    pub(crate) fn primary_first_index_in(&self, displays: &[Display]) -> Option<usize> {
        let primary = primary_of(displays)?;
        if primary.id == self.id {
            return Some(0);
        }
        displays
            .iter()
            .filter(|d| d.id != primary.id)
            .position(|d| d.id == self.id)
            .map(|i| i + 1)
    }
}

/// Returns the primary entry of `displays`, or the first one if none is
/// marked primary.
pub fn primary_of(displays: &[Display]) -> Option<&Display> {
    displays
        .iter()
        .find(|d| d.primary)
        .or_else(|| displays.first())
}

/// Lists the displays that are connected right now.
pub fn connected_displays() -> Result<Vec<Display>> {
    let displays = platform_displays()?;
    if displays.is_empty() {
        log::debug!("no displays enumerated, assuming a single primary display");
        return Ok(vec![Display::fallback_primary()]);
    }
    Ok(displays)
}

#[cfg(target_os = "macos")]
fn platform_displays() -> Result<Vec<Display>> {
    use objc2_core_graphics::{
        CGDirectDisplayID, CGDisplayPixelsHigh, CGDisplayPixelsWide, CGError,
        CGGetActiveDisplayList, CGMainDisplayID,
    };

    use crate::error::WallpaperError;

    let mut count: u32 = 0;
    let result = unsafe { CGGetActiveDisplayList(0, std::ptr::null_mut(), &mut count) };
    if result != CGError::Success {
        return Err(WallpaperError::command(
            "CGGetActiveDisplayList",
            format!("error {:?}", result),
        ));
    }

    let mut ids: Vec<CGDirectDisplayID> = vec![0; count as usize];
    let result = unsafe { CGGetActiveDisplayList(count, ids.as_mut_ptr(), &mut count) };
    if result != CGError::Success {
        return Err(WallpaperError::command(
            "CGGetActiveDisplayList",
            format!("error {:?}", result),
        ));
    }
    ids.truncate(count as usize);

    let main = CGMainDisplayID();
    Ok(ids
        .into_iter()
        .map(|id| Display {
            id: DisplayId(id),
            name: None,
            primary: id == main,
            width: Some(CGDisplayPixelsWide(id) as u32),
            height: Some(CGDisplayPixelsHigh(id) as u32),
        })
        .collect())
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_displays() -> Result<Vec<Display>> {
    if std::env::var_os("DISPLAY").is_none() {
        return Ok(Vec::new());
    }

    match crate::command::output("xrandr", &["--listmonitors"]) {
        Ok(listing) => Ok(parse_xrandr_monitors(&listing)),
        Err(e) => {
            log::debug!("xrandr unavailable: {}", e);
            Ok(Vec::new())
        }
    }
}

#[cfg(not(unix))]
fn platform_displays() -> Result<Vec<Display>> {
    Ok(Vec::new())
}

#[cfg(any(test, all(unix, not(target_os = "macos"))))]
fn monitor_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d+):\s+\+?(\*?)(\S+)\s+(\d+)/\d+x(\d+)/\d+")
            .expect("monitor pattern is valid")
    })
}

/// Parses `xrandr --listmonitors` output.
///
/// ```text
/// Monitors: 2
///  0: +*DP-1 2560/597x1440/336+0+0  DP-1
///  1: +HDMI-1 1920/527x1080/296+2560+0  HDMI-1
/// ```
#[cfg(any(test, all(unix, not(target_os = "macos"))))]
pub(crate) fn parse_xrandr_monitors(listing: &str) -> Vec<Display> {
    let mut displays: Vec<Display> = listing
        .lines()
        .filter_map(|line| {
            let caps = monitor_line().captures(line)?;
            Some(Display {
                id: DisplayId(caps[1].parse().ok()?),
                name: Some(caps[3].to_string()),
                primary: !caps[2].is_empty(),
                width: caps[4].parse().ok(),
                height: caps[5].parse().ok(),
            })
        })
        .collect();

    if !displays.is_empty() && !displays.iter().any(|d| d.primary) {
        displays[0].primary = true;
    }
    displays
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xrandr_monitors() {
        let listing = "Monitors: 2\n 0: +*DP-1 2560/597x1440/336+0+0  DP-1\n 1: +HDMI-1 1920/527x1080/296+2560+0  HDMI-1\n";
        let displays = parse_xrandr_monitors(listing);

        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].id, DisplayId(0));
        assert_eq!(displays[0].name.as_deref(), Some("DP-1"));
        assert!(displays[0].primary);
        assert_eq!(displays[0].width, Some(2560));
        assert_eq!(displays[0].height, Some(1440));
        assert_eq!(displays[1].name.as_deref(), Some("HDMI-1"));
        assert!(!displays[1].primary);
    }

    #[test]
    fn test_parse_xrandr_without_primary_marks_first() {
        let listing = "Monitors: 1\n 0: +eDP-1 1920/344x1080/194+0+0  eDP-1\n";
        let displays = parse_xrandr_monitors(listing);
        assert_eq!(displays.len(), 1);
        assert!(displays[0].primary);
    }

    #[test]
    fn test_parse_xrandr_garbage() {
        assert!(parse_xrandr_monitors("").is_empty());
        assert!(parse_xrandr_monitors("Can't open display").is_empty());
    }

    #[test]
    fn test_primary_of() {
        let mut second = Display::fallback_primary();
        second.id = DisplayId(7);
        let mut first = Display::fallback_primary();
        first.primary = false;

        let displays = vec![first, second];
        assert_eq!(primary_of(&displays).map(|d| d.id), Some(DisplayId(7)));
        assert!(primary_of(&[]).is_none());
    }

    #[test]
    fn test_primary_first_index() {
        let listing = "Monitors: 3\n 0: +HDMI-1 1920/527x1080/296+0+0  HDMI-1\n 1: +*DP-1 2560/597x1440/336+1920+0  DP-1\n 2: +DP-2 1920/527x1080/296+4480+0  DP-2\n";
        let displays = parse_xrandr_monitors(listing);

        assert_eq!(displays[1].index_in(&displays), Some(1));
        assert_eq!(displays[1].primary_first_index_in(&displays), Some(0));
        assert_eq!(displays[0].primary_first_index_in(&displays), Some(1));
        assert_eq!(displays[2].primary_first_index_in(&displays), Some(2));

        let stranger = Display {
            id: DisplayId(9),
            ..Display::fallback_primary()
        };
        assert_eq!(stranger.primary_first_index_in(&displays), None);
    }

    #[test]
    fn test_display_id_formats_as_number() {
        assert_eq!(DisplayId(42).to_string(), "42");
        assert_eq!(serde_json::to_string(&DisplayId(3)).unwrap(), "3");
    }
}
