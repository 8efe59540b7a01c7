//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    source: SourceInfo,
    stream: StreamInfo,
    align: AlignInfo,
    inference: InferenceInfo,
}

#[derive(Serialize)]
struct SourceInfo {
    fps: f64,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct StreamInfo {
    queue_capacity: usize,
    initial_fps: f64,
    resolution: String,
    resolution_pixels: String,
}

#[derive(Serialize)]
struct AlignInfo {
    initial_capacity: usize,
    retained_span_ms: f64,
}

#[derive(Serialize)]
struct InferenceInfo {
    latency_ms: u64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::PipelineBlueprint) -> ConfigInfo {
    let (height, width) = blueprint.stream.resolution.dimensions();
    let frame_interval_ms = 1000.0 / blueprint.source.fps;

    ConfigInfo {
        source: SourceInfo {
            fps: blueprint.source.fps,
            width: blueprint.source.width,
            height: blueprint.source.height,
        },
        stream: StreamInfo {
            queue_capacity: blueprint.stream.queue_capacity,
            initial_fps: blueprint.stream.initial_fps,
            resolution: blueprint.stream.resolution.to_string(),
            resolution_pixels: format!("{}x{}", width, height),
        },
        align: AlignInfo {
            initial_capacity: blueprint.align.initial_capacity,
            retained_span_ms: frame_interval_ms * blueprint.align.initial_capacity as f64,
        },
        inference: InferenceInfo {
            latency_ms: blueprint.inference.latency_ms,
        },
    }
}

fn print_config_info(blueprint: &contracts::PipelineBlueprint) {
    let (height, width) = blueprint.stream.resolution.dimensions();
    let frame_interval_ms = 1000.0 / blueprint.source.fps;
    let retained_ms = frame_interval_ms * blueprint.align.initial_capacity as f64;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Framesync Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📷 Source");
    println!("   ├─ Rate: {} fps", blueprint.source.fps);
    println!(
        "   └─ Frame size: {}x{}",
        blueprint.source.width, blueprint.source.height
    );

    println!("\n🎞  Streaming Buffer");
    println!("   ├─ Queue capacity: {}", blueprint.stream.queue_capacity);
    println!("   ├─ Initial rate: {} fps", blueprint.stream.initial_fps);
    println!(
        "   └─ Served resolution: {} ({}x{})",
        blueprint.stream.resolution, width, height
    );

    println!("\n⏱  Alignment Buffer");
    println!(
        "   ├─ Initial capacity: {}",
        blueprint.align.initial_capacity
    );
    println!("   └─ Retained span: {:.0} ms", retained_ms);

    println!("\n🧠 Simulated Inference");
    println!("   └─ Latency: {} ms", blueprint.inference.latency_ms);

    println!();
}
