//! Animation and layout configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via DFAVIZ_CONFIG)
//! 3. Environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// dfaviz configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token animation.
    pub animation: AnimationConfig,
    /// Graph layout.
    pub layout: LayoutConfig,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("DFAVIZ_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.animation.apply_env_overrides();
        self.layout.apply_env_overrides();
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.animation.validate()?;
        self.layout.validate()
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }
}

/// Token animation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Milliseconds between animation ticks.
    pub tick_interval_ms: u64,
    /// Progress per tick on the legs between node centers and edge ends.
    pub node_step: f64,
    /// Progress per tick along an edge. Smaller than `node_step` so the
    /// token lingers on edges.
    pub edge_step: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 20,
            node_step: 0.1,
            edge_step: 0.02,
        }
    }
}

impl AnimationConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(ms) = std::env::var("DFAVIZ_TICK_MS") {
            if let Ok(parsed) = ms.parse() {
                self.tick_interval_ms = parsed;
            }
        }

        if let Ok(step) = std::env::var("DFAVIZ_NODE_STEP") {
            if let Ok(parsed) = step.parse() {
                self.node_step = parsed;
            }
        }

        if let Ok(step) = std::env::var("DFAVIZ_EDGE_STEP") {
            if let Ok(parsed) = step.parse() {
                self.edge_step = parsed;
            }
        }
    }

    /// Returns the tick interval as Duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "animation.tick_interval_ms must be positive".to_string(),
            ));
        }
        for (name, step) in [("node_step", self.node_step), ("edge_step", self.edge_step)] {
            if step.is_nan() || step <= 0.0 || step > 1.0 {
                return Err(ConfigError::ValidationError(format!(
                    "animation.{} must be in (0, 1], got {}",
                    name, step
                )));
            }
        }
        Ok(())
    }
}

/// Graph layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Radius of the circle nodes are placed on.
    pub radius: f64,
    /// Radius of a drawn node. Edges start and end on its boundary.
    pub node_radius: f64,
    /// Radius of self-loop arcs.
    pub loop_radius: f64,
    /// Sideways offset of curved edges' control point.
    pub curve_bend: f64,
    /// Graph-to-screen scale factor.
    pub scale: f64,
    /// Screen position of the graph origin.
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radius: 150.0,
            node_radius: 20.0,
            loop_radius: 15.0,
            curve_bend: 30.0,
            scale: 1.0,
            offset_x: 400.0,
            offset_y: 200.0,
        }
    }
}

impl LayoutConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(r) = std::env::var("DFAVIZ_LAYOUT_RADIUS") {
            if let Ok(parsed) = r.parse() {
                self.radius = parsed;
            }
        }

        if let Ok(r) = std::env::var("DFAVIZ_NODE_RADIUS") {
            if let Ok(parsed) = r.parse() {
                self.node_radius = parsed;
            }
        }

        if let Ok(s) = std::env::var("DFAVIZ_SCALE") {
            if let Ok(parsed) = s.parse() {
                self.scale = parsed;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale.is_nan() || self.scale <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "layout.scale must be positive, got {}",
                self.scale
            )));
        }
        if self.loop_radius.is_nan() || self.loop_radius <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "layout.loop_radius must be positive, got {}",
                self.loop_radius
            )));
        }
        for (name, value) in [("radius", self.radius), ("node_radius", self.node_radius)] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "layout.{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.animation.tick_interval(), Duration::from_millis(20));
        assert!(config.animation.edge_step < config.animation.node_step);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.animation.node_step, config.animation.node_step);
        assert_eq!(parsed.layout.radius, config.layout.radius);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dfaviz.yaml");
        std::fs::write(&path, "animation:\n  tick_interval_ms: 5\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.animation.tick_interval_ms, 5);
        assert_eq!(config.animation.edge_step, 0.02);
        assert_eq!(config.layout.node_radius, 20.0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.yaml");

        let mut config = Config::default();
        config.layout.scale = 2.5;
        config.save(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.layout.scale, 2.5);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/nonexistent/dfaviz.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(..))));
    }

    #[test]
    fn test_invalid_steps_rejected() {
        let mut animation = AnimationConfig::default();
        animation.edge_step = 0.0;
        assert!(animation.validate().is_err());

        animation.edge_step = 1.5;
        assert!(animation.validate().is_err());

        animation.edge_step = 0.5;
        animation.tick_interval_ms = 0;
        assert!(animation.validate().is_err());
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let mut layout = LayoutConfig::default();
        layout.scale = f64::NAN;
        assert!(layout.validate().is_err());

        layout.scale = 1.0;
        layout.node_radius = 0.0;
        assert!(layout.validate().is_ok());

        layout.node_radius = -1.0;
        match layout.validate() {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("non-negative")),
            other => panic!("expected validation error, got {:?}", other),
        }

        layout.node_radius = 20.0;
        layout.loop_radius = f64::NAN;
        assert!(layout.validate().is_err());
    }
}
