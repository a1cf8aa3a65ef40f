//! Application settings and paths.
//!
//! Settings live in a JSON file in the XDG configuration directory. Every
//! field has a default, so a partial file (or no file) is valid.

use crate::error::{ConfigError, ConfigResult};
use crate::sweep::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE: &str = "settings.json";

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/spyglass)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform configuration directory. Nothing is created.
    pub fn resolve() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "spyglass", "spyglass").ok_or(ConfigError::DirectoryNotFound)?;
        Ok(Self::in_dir(project.config_dir()))
    }

    /// Paths rooted at an explicit directory.
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Create the configuration directory if it does not exist.
    pub fn ensure(&self) -> ConfigResult<()> {
        fs::create_dir_all(&self.config_dir).map_err(|e| ConfigError::WriteFailed {
            path: self.config_dir.clone(),
            reason: e.to_string(),
        })
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Concurrent probes.
    pub concurrency: usize,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
    /// Whole-sweep deadline in seconds, 0 for none.
    pub deadline_secs: u64,
    /// Probes per second, 0 for unlimited.
    pub rate_limit: u32,
    /// Indicator catalog used when `--catalog` is not given.
    pub catalog_path: Option<PathBuf>,
    pub probe_network: bool,
    pub probe_usb: bool,
    pub probe_mdns: bool,
    pub default_output_format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            deadline_secs: 120,
            rate_limit: 0,
            catalog_path: None,
            probe_network: true,
            probe_usb: true,
            probe_mdns: true,
            default_output_format: "plain".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when the file does not exist.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let file = paths.settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the default location, returning the file written.
    pub fn save(&self, paths: &Paths) -> ConfigResult<PathBuf> {
        paths.ensure()?;
        let file = paths.settings_file();
        self.save_to(&file)?;
        Ok(file)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidFormat(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidFormat(
                "timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Sweep deadline, `None` when disabled.
    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.concurrency, 12);
        assert_eq!(settings.timeout_ms, 3000);
        assert_eq!(settings.deadline(), Some(Duration::from_secs(120)));
        assert!(settings.catalog_path.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("settings.json");
        fs::write(&file, r#"{ "concurrency": 4, "deadline_secs": 0 }"#).unwrap();

        let settings = AppSettings::load_from(&file).unwrap();
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.deadline(), None);
        assert_eq!(settings.timeout(), Duration::from_secs(3));
        assert!(settings.probe_usb);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::in_dir(dir.path().join("nested"));
        assert_eq!(AppSettings::load(&paths).unwrap(), AppSettings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let paths = Paths::in_dir(dir.path().join("spyglass"));
        let settings = AppSettings {
            rate_limit: 20,
            catalog_path: Some(PathBuf::from("/etc/spyglass/indicators.yaml")),
            ..AppSettings::default()
        };

        let written = settings.save(&paths).unwrap();
        assert_eq!(written, paths.settings_file());
        assert_eq!(AppSettings::load(&paths).unwrap(), settings);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("settings.json");
        fs::write(&file, r#"{ "concurrency": 0 }"#).unwrap();
        assert!(matches!(
            AppSettings::load_from(&file),
            Err(ConfigError::InvalidFormat(_))
        ));

        fs::write(&file, "not json").unwrap();
        assert!(matches!(
            AppSettings::load_from(&file),
            Err(ConfigError::InvalidFormat(_))
        ));
    }
}
