use anyhow::Result;
use clap::Parser;
use deskpaper_cli::{Cli, Command, DeskpaperCliApp};
use deskpaper_core::{Config, DefaultServiceProvider, WallpaperAccessor};
use std::io::{self, Write};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG wins over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_required(path)?,
        None => Config::load()?,
    };
    log::debug!("using {:?}", config);

    let app = DeskpaperCliApp::new(WallpaperAccessor::with_services(DefaultServiceProvider::new(config)));
    let mut stdout = io::stdout().lock();

    let found = match cli.command {
        Command::Displays { json } => {
            app.list_displays(&mut stdout, json)?;
            true
        }
        Command::Show { display, json } => app.show(&mut stdout, display, json)?,
        Command::Export { output, display } => {
            let exported = app.export(&output, display)?;
            if exported {
                writeln!(stdout, "Saved {}", output.display())?;
            }
            exported
        }
    };

    if !found {
        eprintln!("No wallpaper found.");
        std::process::exit(1);
    }

    Ok(())
}
