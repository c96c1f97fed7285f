//! Configuration for glyphfall, stored as TOML in the platform config dir.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use glyphfall_core::{InvalidTuning, Palette, RainTuning};
use serde::{Deserialize, Serialize};

/// Terminal projection and frame pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Logical pixels covered by one terminal column.
    pub cell_width: f32,
    /// Logical pixels covered by one terminal row.
    pub cell_height: f32,
    /// Target time between frames in milliseconds.
    pub frame_interval_ms: u64,
    /// Rows scrolled per wheel notch or arrow key.
    pub scroll_step_rows: u16,
    /// Whether the rain layers start visible.
    pub show_rain: bool,
    /// Brightness multiplier applied to rain colors.
    pub intensity_gain: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            cell_width: 12.5,
            cell_height: 25.0,
            frame_interval_ms: 33,
            scroll_step_rows: 2,
            show_rain: true,
            intensity_gain: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed RNG seed; random each run when unset.
    pub seed: Option<u64>,
    /// Page colors.
    pub palette: Palette,
    /// Rain and splash constants.
    pub rain: RainTuning,
    /// Terminal projection settings.
    pub display: DisplaySettings,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] InvalidTuning),

    #[error("could not determine config directory")]
    NoConfigDir,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "glyphfall")
}

impl Config {
    /// Default config file path, e.g. `~/.config/glyphfall/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Directory for log files.
    pub fn log_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
    }

    /// Parse a config from TOML text. Missing keys fall back to defaults.
    ///
    /// Rain values the animation cannot use, such as `nan` chances or a
    /// sub-pixel pitch, are rejected.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.rain.validate()?;
        Ok(config)
    }

    /// Load config from a path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from `path`, or the default path when `None`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file
    /// is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let config = Self::load(&path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save config to a path, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to the default path.
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfall_core::Rgb;

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r##"
            seed = 7

            [rain]
            column_pitch = 30.0
            splash_particles = 12

            [palette]
            rain = "#112233"
            "##,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.rain.column_pitch, 30.0);
        assert_eq!(config.rain.splash_particles, 12);
        assert_eq!(config.rain.row_pitch, 25.0);
        assert_eq!(config.palette.rain, Rgb::new(0x11, 0x22, 0x33));
        assert_eq!(config.palette.accent, Palette::default().accent);
    }

    #[test]
    fn test_bad_color_is_parse_error() {
        let result = Config::from_toml("[palette]\nrain = \"teal\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unusable_rain_values_are_invalid() {
        for content in [
            "[rain]\nhighlight_chance = nan\n",
            "[rain]\ncolumn_pitch = 0.0\n",
            "[rain]\nsplash_particles = 100000000\n",
            "[rain]\nfall_duration = { min = 8.0, max = 2.0 }\n",
            "[rain]\nflash_radius = inf\n",
        ] {
            let result = Config::from_toml(content);
            assert!(
                matches!(result, Err(ConfigError::Invalid(_))),
                "{content:?} gave {result:?}"
            );
        }

        let err = Config::from_toml("[rain]\naccent_chance = 2.0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: rain.accent_chance must be in [0, 1]"
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("glyphfall-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        let mut config = Config::default();
        config.display.frame_interval_ms = 16;
        config.seed = Some(42);

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("glyphfall-definitely-missing.toml");
        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
    }
}
