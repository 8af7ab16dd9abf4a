use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    session::EditSettings,
};

/// Main configuration for Reel-Composer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output settings for new sessions
    pub output: EditSettings,

    /// Encoder settings
    pub encode: EncodeConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.output.validate()?;
        self.encode.validate()?;
        Ok(())
    }
}

/// Encoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Output frame rate
    pub fps: f64,

    /// x264 speed preset
    pub preset: String,

    /// x264 constant rate factor (0-51, lower is better)
    pub crf: u8,

    /// Audio bitrate passed to the audio encoder
    pub audio_bitrate: String,

    /// Path or name of the ffmpeg executable
    pub ffmpeg_path: PathBuf,

    /// Path or name of the ffprobe executable
    pub ffprobe_path: PathBuf,

    /// Where session workspaces are created (system temp dir if unset)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            fps: 24.0,
            preset: "medium".to_string(),
            crf: 23,
            audio_bitrate: "192k".to_string(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            scratch_dir: None,
        }
    }
}

impl EncodeConfig {
    fn validate(&self) -> Result<()> {
        if !(self.fps > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "encode.fps".to_string(),
                value: self.fps.to_string()
            }.into());
        }

        if self.crf > 51 {
            return Err(ConfigError::InvalidValue {
                key: "encode.crf".to_string(),
                value: self.crf.to_string()
            }.into());
        }

        if self.preset.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "encode.preset".to_string(),
                value: self.preset.clone()
            }.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Filter, Transition};
    use crate::media::ExportFormat;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.encode.fps, 24.0);
        assert_eq!((config.output.width, config.output.height), (1280, 720));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original_config = Config::default();
        original_config.output.filter = Filter::ColorBoost;
        original_config.output.transition = Transition::Slide;
        original_config.output.format = ExportFormat::Mov;

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[output]\nwidth = 1920\nfilter = \"sepia\"\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.output.width, 1920);
        assert_eq!(config.output.height, 720);
        assert_eq!(config.output.filter, Filter::Sepia);
        assert_eq!(config.encode, EncodeConfig::default());
    }

    #[test]
    fn test_unknown_filter_in_file_means_none() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("odd.toml");
        std::fs::write(&file_path, "[output]\nfilter = \"posterize\"\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.output.filter, Filter::None);
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::from_file("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn test_invalid_encode_config() {
        let mut config = Config::default();
        config.encode.fps = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.encode.crf = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_bounds_size() {
        let mut config = Config::default();
        config.output.width = 100;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.height = 4000;
        assert!(config.validate().is_err());
    }
}
