//! Engine and window configuration, loadable from YAML.
//!
//! ```yaml
//! engine:
//!   target_fps: 75
//!   target_ups: 30
//!   max_catch_up_steps: 10
//!   execution_mode: inline
//! window:
//!   title: cadence
//!   width: 1280
//!   height: 720
//!   vsync: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::ExecutionMode;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame rate cap used when the window has no vertical sync.
    pub target_fps: u32,
    /// Fixed simulation updates per second.
    pub target_ups: u32,
    /// Upper bound on catch-up updates per frame. `None` never drops time.
    pub max_catch_up_steps: Option<u32>,
    /// Where the loop runs. `None` picks the host default at launch.
    pub execution_mode: Option<ExecutionMode>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 75,
            target_ups: 30,
            max_catch_up_steps: None,
            execution_mode: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be positive".into()));
        }
        if self.target_ups == 0 {
            return Err(ConfigError::Invalid("target_ups must be positive".into()));
        }
        if self.max_catch_up_steps == Some(0) {
            return Err(ConfigError::Invalid(
                "max_catch_up_steps must be positive when set".into(),
            ));
        }
        Ok(())
    }

    /// Length of one simulation step.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_ups.max(1)
    }

    /// Minimum time between frames when pacing without vsync.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    /// The configured execution mode, or the host default.
    pub fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode.unwrap_or_else(ExecutionMode::for_host)
    }
}

/// Window settings for embodiments that open one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "cadence".into(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub window: WindowConfig,
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_rates() {
        let config = EngineConfig::default();
        assert_eq!(config.target_fps, 75);
        assert_eq!(config.target_ups, 30);
        assert_eq!(config.max_catch_up_steps, None);
        assert_eq!(config.update_interval(), Duration::from_nanos(33_333_333));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml_str("engine:\n  target_ups: 60\n").unwrap();
        assert_eq!(config.engine.target_ups, 60);
        assert_eq!(config.engine.target_fps, 75);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn execution_mode_parses_snake_case() {
        let config = Config::from_yaml_str("engine:\n  execution_mode: dedicated_thread\n").unwrap();
        assert_eq!(config.engine.execution_mode(), ExecutionMode::DedicatedThread);
    }

    #[test]
    fn zero_rates_are_rejected() {
        let err = Config::from_yaml_str("engine:\n  target_fps: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Config::from_yaml_str("engine:\n  max_catch_up_steps: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "window:\n  title: demo\n  vsync: false").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.window.title, "demo");
        assert!(!config.window.vsync);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
