//! Configuration validation
//!
//! Validation rules:
//! - source.fps > 0 and finite
//! - source.width / source.height >= 1
//! - stream.queue_capacity >= 1
//! - stream.initial_fps > 0 and finite
//! - align.initial_capacity >= 1

use contracts::{PipelineBlueprint, PipelineError};

/// Validate a PipelineBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    validate_source(blueprint)?;
    validate_stream(blueprint)?;
    validate_align(blueprint)?;
    Ok(())
}

/// Validate the synthetic source settings
fn validate_source(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    let source = &blueprint.source;

    if !source.fps.is_finite() || source.fps <= 0.0 {
        return Err(PipelineError::config_validation(
            "source.fps",
            format!("fps must be a finite value > 0, got {}", source.fps),
        ));
    }

    if source.width == 0 || source.height == 0 {
        return Err(PipelineError::config_validation(
            "source.width / source.height",
            format!(
                "frame dimensions must be >= 1, got {}x{}",
                source.width, source.height
            ),
        ));
    }

    Ok(())
}

/// Validate the streaming buffer settings
fn validate_stream(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    let stream = &blueprint.stream;

    if stream.queue_capacity == 0 {
        return Err(PipelineError::config_validation(
            "stream.queue_capacity",
            "queue_capacity must be >= 1",
        ));
    }

    // initial_fps seeds the refresh interval; zero or non-finite would
    // break the sleep computation before the first real estimate lands.
    if !stream.initial_fps.is_finite() || stream.initial_fps <= 0.0 {
        return Err(PipelineError::config_validation(
            "stream.initial_fps",
            format!(
                "initial_fps must be a finite value > 0, got {}",
                stream.initial_fps
            ),
        ));
    }

    Ok(())
}

/// Validate the alignment buffer settings
fn validate_align(blueprint: &PipelineBlueprint) -> Result<(), PipelineError> {
    if blueprint.align.initial_capacity == 0 {
        return Err(PipelineError::config_validation(
            "align.initial_capacity",
            "initial_capacity must be >= 1",
        ));
    }
    Ok(())
}
