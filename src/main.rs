use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use capture_sync::audio::FfmpegDecoder;
use capture_sync::{BatchDriver, Config};

#[derive(Parser, Debug)]
#[command(name = "capture-sync")]
#[command(about = "Synchronize head-camera video and IMU suit captures by the opening clap")]
struct Args {
    /// Sequence identifier naming one capture session
    #[arg(value_name = "SEQUENCE", default_value = "SUB4_MPI_Etage6_working_standing")]
    sequence: String,

    /// TOML file with the path roots
    #[arg(long, value_name = "FILE", default_value = "capture_sync.toml")]
    config: PathBuf,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    config.validate()?;

    let decoder = FfmpegDecoder::new(config.audio.ffmpeg.clone(), config.audio.decode_sample_rate);
    let driver = BatchDriver::new(config, decoder);

    let summary = driver
        .run(&args.sequence)
        .with_context(|| format!("processing {}", args.sequence))?;

    println!("IMU starts at : {}", summary.offset.imu_start);
    println!("Camera starts at : {}", summary.offset.cam_start);
    for artifact in &summary.artifacts {
        println!("  {:<22} {}", artifact.kind.as_str(), artifact.path.display());
    }

    Ok(())
}
