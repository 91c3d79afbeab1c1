mod project;
mod simulate;

use cadence_kernel::Config;
use cadence_render::{FOV_DEGREES, SPECULAR_EXPONENT, Z_FAR, Z_NEAR};
use cadence_scene::Camera;
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::simulate::SimulationParams;

#[derive(Parser)]
#[command(name = "cadence-cli", about = "CLI tool for cadence: headless runs and projection checks")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, loop rates and renderer constants
    Info,
    /// Run the game loop headless on a manual clock
    Simulate {
        /// Frames to present before closing
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Time each frame observes, in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: u64,
        /// Cubes in the scene
        #[arg(long, default_value = "3")]
        items: usize,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Project a world-space point through the camera
    Project {
        #[arg(allow_negative_numbers = true)]
        x: f32,
        #[arg(allow_negative_numbers = true)]
        y: f32,
        #[arg(allow_negative_numbers = true)]
        z: f32,
        /// Camera position as x,y,z
        #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
        camera: Option<Vec<f32>>,
        /// Camera rotation in degrees as pitch,yaw,roll
        #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
        rotation: Option<Vec<f32>>,
    },
}

fn vec3(values: Option<Vec<f32>>) -> Vec3 {
    values.map_or(Vec3::ZERO, |v| Vec3::from_slice(&v))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("cadence-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "loop: ups={} fps={} mode={:?} catch_up={:?}",
                config.engine.target_ups,
                config.engine.target_fps,
                config.engine.execution_mode(),
                config.engine.max_catch_up_steps
            );
            println!(
                "window: {:?} {}x{} vsync={}",
                config.window.title, config.window.width, config.window.height, config.window.vsync
            );
            println!("render: fov={FOV_DEGREES} near={Z_NEAR} far={Z_FAR} specular_power={SPECULAR_EXPONENT}");
        }
        Commands::Simulate {
            frames,
            frame_ms,
            items,
            json,
        } => {
            let params = SimulationParams {
                frames,
                frame_time: Duration::from_millis(frame_ms),
                items,
                width: config.window.width,
                height: config.window.height,
            };
            let report = simulate::run(config.engine, &params)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "frames={} updates={} draws={} viewport={}x{} live_resources={}",
                    report.frames,
                    report.updates,
                    report.draws,
                    report.viewport.width,
                    report.viewport.height,
                    report.live_resources
                );
            }
        }
        Commands::Project {
            x,
            y,
            z,
            camera,
            rotation,
        } => {
            let camera = Camera::new(vec3(camera), vec3(rotation));
            let result = project::project(
                Vec3::new(x, y, z),
                &camera,
                config.window.width,
                config.window.height,
            );
            tracing::info!(x, y, z, visible = result.visible, "projected point");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
