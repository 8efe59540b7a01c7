//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{PipelineBlueprint, PipelineError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<PipelineBlueprint, PipelineError> {
    toml::from_str(content).map_err(|e| PipelineError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<PipelineBlueprint, PipelineError> {
    serde_json::from_str(content).map_err(|e| PipelineError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<PipelineBlueprint, PipelineError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Resolution;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[source]
fps = 24.0
width = 1280
height = 720

[stream]
queue_capacity = 32
initial_fps = 24.0
resolution = "hd"

[align]
initial_capacity = 10

[inference]
latency_ms = 150
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.source.width, 1280);
        assert_eq!(bp.stream.resolution, Resolution::Hd);
        assert_eq!(bp.inference.latency_ms, 150);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "source": { "fps": 15.0, "width": 640, "height": 480 },
            "stream": { "queue_capacity": 16, "initial_fps": 15.0, "resolution": "sd" },
            "align": { "initial_capacity": 20 },
            "inference": { "latency_ms": 50 }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        assert_eq!(result.unwrap().align.initial_capacity, 20);
    }

    #[test]
    fn test_parse_toml_applies_defaults() {
        // Every section is optional; omitted fields fall back to defaults.
        let bp = parse_toml("[stream]\nqueue_capacity = 8\n").unwrap();
        assert_eq!(bp.stream.queue_capacity, 8);
        assert_eq!(bp.source.fps, 30.0);
        assert_eq!(bp.align.initial_capacity, 10);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
