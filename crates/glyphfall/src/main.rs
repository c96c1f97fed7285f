mod app;
mod page;

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{OptionExt, WrapErr};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use glyphfall_config::Config;
use ratatui::DefaultTerminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;

/// Environment variable holding the log filter; `RUST_LOG` is the fallback.
const LOG_ENV: &str = "GLYPHFALL_LOG";

#[derive(Debug, Parser)]
#[command(name = "glyphfall")]
#[command(version)]
#[command(about = "A scroll-linked glyph rain landing page for the terminal", long_about = None)]
struct Cli {
    /// Config file to load instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fixed seed for the rain's random choices
    #[arg(short, long, value_name = "N")]
    seed: Option<u64>,

    /// Write the default configuration file and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.write_default_config {
        let path = match cli.config {
            Some(path) => path,
            None => Config::default_path().ok_or_eyre("could not determine config directory")?,
        };
        Config::default()
            .save(&path)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let log_path = init_logging()?;
    let config = Config::load_or_default(cli.config.as_deref()).wrap_err("failed to load config")?;
    let seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);
    info!(seed, log = ?log_path, "glyphfall starting");

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, config, seed);
    if let Err(err) = execute!(io::stdout(), DisableMouseCapture) {
        warn!(%err, "failed to release mouse capture");
    }
    ratatui::restore();
    result
}

fn run(terminal: &mut DefaultTerminal, config: Config, seed: u64) -> color_eyre::Result<()> {
    execute!(io::stdout(), EnableMouseCapture)?;
    let size = terminal.size()?;
    App::new(config, seed, size.width, size.height).run(terminal)
}

/// Send logs to a file in the data directory; the terminal belongs to the UI.
///
/// Returns `None` when the platform has no data directory.
fn init_logging() -> color_eyre::Result<Option<PathBuf>> {
    let Some(dir) = Config::log_dir() else {
        return Ok(None);
    };
    fs::create_dir_all(&dir).wrap_err_with(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join("glyphfall.log");
    let file = File::create(&path).wrap_err_with(|| format!("failed to open {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(Some(path))
}
