pub use crate::app::{DeskpaperCliApp, WallpaperReport};
pub use crate::cli::{Cli, Command};

mod cli {
    use clap::{Parser, Subcommand};
    use deskpaper_core::DisplayId;
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    #[command(name = "deskpaper")]
    #[command(about = "Deskpaper - read the current desktop wallpaper")]
    #[command(version)]
    pub struct Cli {
        /// Config file to use instead of the default location
        #[arg(long, global = true)]
        pub config: Option<PathBuf>,

        /// More logging (-v info, -vv debug)
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        pub verbose: u8,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Subcommand, Debug)]
    pub enum Command {
        /// List connected displays
        Displays {
            #[arg(long)]
            json: bool,
        },
        /// Show where the wallpaper lives and how big it is
        Show {
            /// Display id, as listed by `deskpaper displays`. Defaults to the primary display
            #[arg(short, long, value_parser = parse_display_id)]
            display: Option<DisplayId>,
            #[arg(long)]
            json: bool,
        },
        /// Write the decoded wallpaper to a new image file
        Export {
            /// Output file; the format follows its extension
            output: PathBuf,
            #[arg(short, long, value_parser = parse_display_id)]
            display: Option<DisplayId>,
        },
    }

    fn parse_display_id(s: &str) -> Result<DisplayId, String> {
        s.parse::<u32>()
            .map(DisplayId)
            .map_err(|_| format!("invalid display id: {}", s))
    }
}

mod app {
    use anyhow::{bail, Context, Result};
    use deskpaper_core::{
        DefaultServiceProvider, DisplayId, ServiceProvider, WallpaperAccessor, WallpaperImage,
    };
    use serde::Serialize;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Serialize, PartialEq)]
    pub struct WallpaperReport {
        pub display: Option<DisplayId>,
        pub path: PathBuf,
        pub width: u32,
        pub height: u32,
    }

    pub struct DeskpaperCliApp<S = DefaultServiceProvider> {
        accessor: WallpaperAccessor<S>,
    }

    impl<S: ServiceProvider + Send + Sync + 'static> DeskpaperCliApp<S> {
        pub fn new(accessor: WallpaperAccessor<S>) -> Self {
            Self { accessor }
        }

        /// Primary display through the synchronous accessor, anything else
        /// through the background one.
        fn fetch(&self, display: Option<DisplayId>) -> Option<WallpaperImage> {
            match display {
                Some(id) => self.accessor.for_display_channel(id).recv().unwrap_or(None),
                None => self.accessor.primary(),
            }
        }

        pub fn list_displays<W: Write>(&self, out: &mut W, json: bool) -> Result<()> {
            let displays = self.accessor.displays().context("Failed to list displays")?;

            if json {
                serde_json::to_writer_pretty(&mut *out, &displays)?;
                writeln!(out)?;
                return Ok(());
            }

            for display in &displays {
                let size = match (display.width, display.height) {
                    (Some(w), Some(h)) => format!("{}x{}", w, h),
                    _ => "unknown size".to_string(),
                };
                writeln!(
                    out,
                    "{}{} {} ({})",
                    display.id,
                    if display.primary { "*" } else { "" },
                    display.name.as_deref().unwrap_or("-"),
                    size
                )?;
            }
            Ok(())
        }

        /// Returns `Ok(false)` when there is no wallpaper to show.
        pub fn show<W: Write>(&self, out: &mut W, display: Option<DisplayId>, json: bool) -> Result<bool> {
            let Some(image) = self.fetch(display) else {
                return Ok(false);
            };

            let report = WallpaperReport {
                display,
                path: image.path().to_path_buf(),
                width: image.width(),
                height: image.height(),
            };

            if json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                writeln!(out, "Wallpaper: {}", report.path.display())?;
                writeln!(out, "Size: {}x{}", report.width, report.height)?;
            }
            Ok(true)
        }

        /// Returns `Ok(false)` when there is no wallpaper to export.
        pub fn export(&self, output: &Path, display: Option<DisplayId>) -> Result<bool> {
            let Some(image) = self.fetch(display) else {
                return Ok(false);
            };

            if is_same_file(output, image.path()) {
                bail!(
                    "Refusing to overwrite the wallpaper itself: {}",
                    output.display()
                );
            }

            image
                .image()
                .save(output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log::info!("exported {} to {}", image.path().display(), output.display());
            Ok(true)
        }
    }

    fn is_same_file(a: &Path, b: &Path) -> bool {
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        }
    }
}
