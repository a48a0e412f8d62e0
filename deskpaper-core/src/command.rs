use std::process::Command;

use crate::error::{Result, WallpaperError};

/// Runs `program` with `args` and returns its trimmed stdout.
///
/// A non-zero exit status is an error carrying the program's stderr.
pub(crate) fn output(program: &str, args: &[&str]) -> Result<String> {
    log::trace!("running {} {:?}", program, args);

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| WallpaperError::command(program, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WallpaperError::command(
            program,
            format!("{} ({})", stderr.trim(), output.status),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
