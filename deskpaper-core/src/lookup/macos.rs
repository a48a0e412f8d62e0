use crate::command;
use crate::display::Display;
use crate::error::Result;

/// Asks System Events for the picture of the desktop that belongs to
/// `display`. A desktop's `id` is the CoreGraphics display id, so the lookup
/// does not depend on the order desktops are listed in.
pub(super) fn lookup(display: &Display) -> Result<String> {
    command::output("osascript", &["-e", &desktop_picture_script(display)])
}

fn desktop_picture_script(display: &Display) -> String {
    format!(
        "tell application \"System Events\" to get picture of (first desktop whose id is {})",
        display.id
    )
}
