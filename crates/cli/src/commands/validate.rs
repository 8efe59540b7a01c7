//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    source_fps: f64,
    frame_size: String,
    stream_resolution: String,
    align_capacity: usize,
    inference_latency_ms: u64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    source_fps: blueprint.source.fps,
                    frame_size: format!("{}x{}", blueprint.source.width, blueprint.source.height),
                    stream_resolution: blueprint.stream.resolution.to_string(),
                    align_capacity: blueprint.align.initial_capacity,
                    inference_latency_ms: blueprint.inference.latency_ms,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::PipelineBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // Slow inference over a small ring forces repeated capacity growth
    let frame_interval_ms = 1000.0 / blueprint.source.fps;
    let retained_ms = frame_interval_ms * blueprint.align.initial_capacity as f64;
    if (blueprint.inference.latency_ms as f64) > retained_ms {
        warnings.push(format!(
            "inference latency ({} ms) exceeds the alignment buffer's retained span \
             ({:.0} ms) - the ring will grow until it covers the latency",
            blueprint.inference.latency_ms, retained_ms
        ));
    }

    // A mismatched initial rate only costs pacing accuracy before the
    // first estimate lands, but it is usually a config typo
    if (blueprint.stream.initial_fps - blueprint.source.fps).abs() > f64::EPSILON {
        warnings.push(format!(
            "stream.initial_fps ({}) differs from source.fps ({})",
            blueprint.stream.initial_fps, blueprint.source.fps
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Source rate: {} fps", summary.source_fps);
            println!("  Frame size: {}", summary.frame_size);
            println!("  Stream resolution: {}", summary.stream_resolution);
            println!("  Align capacity: {}", summary.align_capacity);
            println!("  Inference latency: {} ms", summary.inference_latency_ms);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
