mod demo;
mod window;

use anyhow::Result;
use cadence_kernel::{Config, ExecutionMode, launch};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::demo::DemoGame;
use crate::window::DesktopWindow;

#[derive(Parser, Debug)]
#[command(name = "cadence-desktop", about = "Cadence desktop demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window title
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Let the display pace frames (true) or sleep to the target frame rate (false)
    #[arg(long)]
    vsync: Option<bool>,

    /// Simulation updates per second
    #[arg(long)]
    ups: Option<u32>,

    /// Target frames per second when vsync is off
    #[arg(long)]
    fps: Option<u32>,

    /// Where the loop runs: inline or dedicated_thread
    #[arg(long, value_parser = parse_mode)]
    mode: Option<ExecutionMode>,
}

fn parse_mode(s: &str) -> Result<ExecutionMode, String> {
    match s {
        "inline" => Ok(ExecutionMode::Inline),
        "dedicated_thread" | "thread" => Ok(ExecutionMode::DedicatedThread),
        other => Err(format!("unknown execution mode {other:?}")),
    }
}

impl Cli {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(title) = &self.title {
            config.window.title = title.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if let Some(vsync) = self.vsync {
            config.window.vsync = vsync;
        }
        if let Some(ups) = self.ups {
            config.engine.target_ups = ups;
        }
        if let Some(fps) = self.fps {
            config.engine.target_fps = fps;
        }
        if self.mode.is_some() {
            config.engine.execution_mode = self.mode;
        }
        config.engine.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("cadence-desktop starting");
    let config = cli.resolve_config()?;

    let window_config = config.window.clone();
    let stats = launch(
        config.engine,
        move || DesktopWindow::open(window_config),
        DemoGame::new(),
    )?;

    tracing::info!(frames = stats.frames, updates = stats.updates, "cadence-desktop stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["cadence-desktop", "--ups", "60", "--width", "800", "--vsync", "false"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.engine.target_ups, 60);
        assert_eq!(config.window.width, 800);
        assert!(!config.window.vsync);
        assert_eq!(config.engine.target_fps, 75);
    }

    #[test]
    fn zero_rate_flag_rejected() {
        let cli = Cli::parse_from(["cadence-desktop", "--fps", "0"]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn mode_flag_parses() {
        let cli = Cli::parse_from(["cadence-desktop", "--mode", "inline"]);
        assert_eq!(cli.mode, Some(ExecutionMode::Inline));
        assert!(parse_mode("sideways").is_err());
    }
}
