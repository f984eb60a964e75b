use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent defaults, loaded from `~/.config/shellcloud/config.yaml`.
///
/// Every field is optional on disk; CLI flags always win over config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Fixed canvas width; unset means auto-detect
    pub width: Option<u32>,
    /// Fixed canvas height; unset means auto-detect
    pub height: Option<u32>,
    /// Directory the default timestamped filename is placed in
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Preferred built-in logo, overriding distro detection
    pub logo: Option<String>,
    /// Background color as #RRGGBB
    #[serde(default = "default_bg_color")]
    pub bg_color: String,
    /// Word colors as #RRGGBB; empty means the default gradient
    #[serde(default)]
    pub colors: Vec<String>,
    /// Font file used for rendering; unset means system sans-serif
    pub font_file: Option<PathBuf>,
}

fn default_bg_color() -> String {
    "#FFFFFF".to_string()
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            logo: None,
            bg_color: default_bg_color(),
            colors: Vec::new(),
            font_file: None,
        }
    }
}

impl Config {
    /// Load configuration from a specific file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load configuration from the default location, or built-in defaults if
    /// no config file exists.
    ///
    /// # Errors
    /// Returns an error only if a config file exists but is malformed.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("shellcloud").join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.output.width.is_none());
        assert_eq!(config.style.bg_color, "#FFFFFF");
        assert!(config.style.colors.is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r##"
output:
  width: 2560
  height: 1440
style:
  logo: arch
  colors: ["#264653", "#2a9d8f"]
"##;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.output.width, Some(2560));
        assert_eq!(config.style.logo.as_deref(), Some("arch"));
        assert_eq!(config.style.colors.len(), 2);
        // Unset fields keep their defaults
        assert_eq!(config.style.bg_color, "#FFFFFF");
    }

    #[test]
    fn test_config_load_missing_file_is_error() {
        assert!(Config::load_from_file("/nonexistent/config.yaml").is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "style:\n  bg_color: \"#000000\"\n").unwrap();
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.style.bg_color, "#000000");
    }
}
