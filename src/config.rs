//! User configuration and fan profile presets.
//!
//! The configuration is a JSON document in the user config directory.
//! A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{CommanderError, Result};

// =============================================================================
// Config Path
// =============================================================================

const APP_NAME: &str = "commander-rust";
const CONFIG_FILE: &str = "config.json";

/// Get the configuration directory path.
/// - Linux: ~/.config/commander-rust/
/// - Windows: %APPDATA%\commander-rust\
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| CommanderError::Storage("Could not find config directory".into()))
}

/// Get the full path to the config file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

// =============================================================================
// Pre-defined Profiles
// =============================================================================

/// Quiet profile, ramps up past 45°C.
pub const PROFILE_SILENT: [(u8, u16); 4] = [(25, 600), (35, 800), (45, 1200), (55, 2400)];

/// Aggressive cooling.
pub const PROFILE_PERFORMANCE: [(u8, u16); 4] = [(25, 1200), (35, 1800), (45, 2800), (50, 4000)];

/// Look up a built-in profile by name.
pub fn builtin_profile(name: &str) -> Option<&'static [(u8, u16)]> {
    let profile: &'static [(u8, u16)] = match name.to_lowercase().as_str() {
        "silent" => &PROFILE_SILENT,
        "performance" => &PROFILE_PERFORMANCE,
        _ => return None,
    };
    Some(profile)
}

// =============================================================================
// App Config
// =============================================================================

/// Main configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base directory of the per-device session state, overriding the
    /// runtime directory.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Default probe followed by fan profiles, 1-indexed.
    #[serde(default = "default_temperature_sensor")]
    pub temperature_sensor: u8,

    /// Named fan profiles as (temperature, value) points.
    #[serde(default)]
    pub profiles: HashMap<String, Vec<(u8, u16)>>,
}

fn default_temperature_sensor() -> u8 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            temperature_sensor: default_temperature_sensor(),
            profiles: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load configuration from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CommanderError::Storage(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| CommanderError::Storage(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    /// Save configuration to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                CommanderError::Storage(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CommanderError::Storage(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CommanderError::Storage(format!("Failed to write config: {}", e)))
    }

    /// Get a fan profile by name, ignoring case: user profiles first, then
    /// built-ins.
    pub fn profile(&self, name: &str) -> Result<Vec<(u8, u16)>> {
        let wanted = name.to_lowercase();
        if let Some(points) = self
            .profiles
            .iter()
            .find_map(|(key, points)| (key.to_lowercase() == wanted).then_some(points))
        {
            return Ok(points.clone());
        }

        builtin_profile(name)
            .map(<[_]>::to_vec)
            .ok_or_else(|| CommanderError::InvalidInput(format!("Profile '{}' not found", name)))
    }

    /// Store a named fan profile, replacing any profile whose name differs
    /// only in case.
    pub fn insert_profile(&mut self, name: &str, points: Vec<(u8, u16)>) {
        let key = name.to_lowercase();
        self.profiles.retain(|existing, _| existing.to_lowercase() != key);
        self.profiles.insert(key, points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.temperature_sensor, 1);
        assert!(config.storage_dir.is_none());
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_partial_document() {
        let config: AppConfig =
            serde_json::from_str(r#"{"profiles": {"quiet": [[30, 500], [50, 1500]]}}"#).unwrap();
        assert_eq!(config.temperature_sensor, 1);
        assert_eq!(config.profile("quiet").unwrap(), vec![(30, 500), (50, 1500)]);
    }

    #[test]
    fn test_builtin_profiles() {
        let config = AppConfig::default();
        assert_eq!(config.profile("Silent").unwrap(), PROFILE_SILENT.to_vec());
        assert_eq!(config.profile("performance").unwrap(), PROFILE_PERFORMANCE.to_vec());
        assert!(config.profile("turbo").is_err());
    }

    #[test]
    fn test_user_profile_shadows_builtin() {
        let mut config = AppConfig::default();
        config.profiles.insert("silent".into(), vec![(40, 900)]);
        assert_eq!(config.profile("silent").unwrap(), vec![(40, 900)]);
    }

    #[test]
    fn test_profile_names_ignore_case() {
        let config: AppConfig =
            serde_json::from_str(r#"{"profiles": {"Quiet": [[30, 500]]}}"#).unwrap();
        assert_eq!(config.profile("Quiet").unwrap(), vec![(30, 500)]);
        assert_eq!(config.profile("quiet").unwrap(), vec![(30, 500)]);
        assert_eq!(config.profile("QUIET").unwrap(), vec![(30, 500)]);
    }

    #[test]
    fn test_insert_profile_replaces_other_case() {
        let mut config: AppConfig =
            serde_json::from_str(r#"{"profiles": {"Quiet": [[30, 500]]}}"#).unwrap();
        config.insert_profile("QUIET", vec![(35, 700)]);

        assert_eq!(config.profiles.len(), 1);
        assert_eq!(config.profiles["quiet"], vec![(35, 700)]);
        assert_eq!(config.profile("Quiet").unwrap(), vec![(35, 700)]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());

        let mut config = AppConfig::default();
        config.temperature_sensor = 3;
        config.storage_dir = Some(dir.path().join("state"));
        config.insert_profile("quiet", vec![(30, 700)]);
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CommanderError::Storage(_)));
    }
}
