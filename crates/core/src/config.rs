use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::ColorThresholds;
use crate::limits::{ToolLimits, MAX_UNIVERSE};
use crate::patch::PrintOptions;

/// Configuration manager for the calculator settings.
/// Separates the schema (defaults and valid ranges) from the persisted values,
/// which live in a JSON file, `tools.json` in the working directory by default.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: ToolSettings,
}

/// Settings shared by every calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolSettings {
    /// Default universe size for the patch sheet and capacity tools.
    pub channels_per_universe: u32,
    /// Name used for fixtures left blank.
    pub fallback_name: String,
    pub color: ColorThresholds,
    pub print: PrintOptions,
    pub limits: ToolLimits,
}

/// Available configuration options with validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub patch: PatchConfigSchema,
    pub color: ColorConfigSchema,
    pub limits: LimitsConfigSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchConfigSchema {
    pub channels_per_universe: ConfigOption<u32>,
    pub labels_per_page: ConfigOption<usize>,
    pub fallback_name: ConfigOption<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfigSchema {
    pub default_kelvin: ConfigOption<f64>,
    pub white_threshold: ConfigOption<f64>,
    pub saturation_cutoff: ConfigOption<f64>,
    pub white_limit: ConfigOption<f64>,
    pub amber_hue_min: ConfigOption<f64>,
    pub amber_hue_max: ConfigOption<f64>,
    pub amber_min_saturation: ConfigOption<f64>,
    pub amber_strength: ConfigOption<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfigSchema {
    pub max_universe: ConfigOption<u32>,
    pub max_patch_rows: ConfigOption<u32>,
    pub max_power_units: ConfigOption<u32>,
    pub max_circuits: ConfigOption<u32>,
    pub max_phases: ConfigOption<u32>,
}

/// Configuration option with its default and valid range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub description: String,
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: ToolSettings,
    pub created_at: String,
    pub modified_at: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
    #[error("Config validation errors: {}", .0.join(", "))]
    ValidationError(Vec<String>),
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            channels_per_universe: 512,
            fallback_name: "Fixture".to_string(),
            color: ColorThresholds::default(),
            print: PrintOptions::default(),
            limits: ToolLimits::default(),
        }
    }
}

impl<T: PartialOrd + std::fmt::Display> ConfigOption<T> {
    fn new(default: T, valid_range: Option<(T, T)>, description: &str) -> Self {
        Self {
            default,
            valid_range,
            description: description.to_string(),
        }
    }

    fn check(&self, name: &str, value: &T, errors: &mut Vec<String>) {
        if let Some((min, max)) = &self.valid_range {
            // NaN fails both comparisons, so test for containment
            if !(value >= min && value <= max) {
                errors.push(format!("{} must be between {} and {}", name, min, max));
            }
        }
    }
}

impl ConfigManager {
    /// Create a new configuration manager
    /// If no path is provided, defaults to 'tools.json' in the current working directory
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path: config_path.unwrap_or_else(|| PathBuf::from("tools.json")),
            settings: ToolSettings::default(),
        }
    }

    /// Load settings from the configuration file.
    /// A missing file is created with the defaults.
    pub fn load(&mut self) -> Result<ToolSettings, ConfigError> {
        if !self.config_path.exists() {
            log::info!(
                "No tool config at {}, writing defaults",
                self.config_path.display()
            );
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match application version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: now.clone(),
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get configuration schema with defaults and valid ranges
    pub fn schema() -> ConfigSchema {
        let color = ColorThresholds::default();
        let defaults = ToolSettings::default();

        ConfigSchema {
            patch: PatchConfigSchema {
                channels_per_universe: ConfigOption::new(
                    defaults.channels_per_universe,
                    Some((1, 512)),
                    "Channels per universe",
                ),
                labels_per_page: ConfigOption::new(
                    defaults.print.labels_per_page,
                    Some((1, 48)),
                    "Labels per printed A4 page",
                ),
                fallback_name: ConfigOption {
                    default: defaults.fallback_name,
                    valid_range: None,
                    description: "Name used for fixtures left blank".to_string(),
                },
            },
            color: ColorConfigSchema {
                default_kelvin: ConfigOption::new(
                    color.default_kelvin,
                    Some((1800.0, 10000.0)),
                    "Colour temperature used when none is entered",
                ),
                white_threshold: ConfigOption::new(
                    color.white_threshold,
                    Some((0.0, 1.0)),
                    "Minimum neutral level before white emitters are used",
                ),
                saturation_cutoff: ConfigOption::new(
                    color.saturation_cutoff,
                    Some((0.0, 1.0)),
                    "Colours at or above this saturation keep white in RGB",
                ),
                white_limit: ConfigOption::new(
                    color.white_limit,
                    Some((0.0, 1.0)),
                    "White ceiling when limiting white output",
                ),
                amber_hue_min: ConfigOption::new(
                    color.amber_hue_min,
                    Some((0.0, 360.0)),
                    "Lower hue bound for amber extraction",
                ),
                amber_hue_max: ConfigOption::new(
                    color.amber_hue_max,
                    Some((0.0, 360.0)),
                    "Upper hue bound for amber extraction",
                ),
                amber_min_saturation: ConfigOption::new(
                    color.amber_min_saturation,
                    Some((0.0, 1.0)),
                    "Minimum saturation for amber extraction",
                ),
                amber_strength: ConfigOption::new(
                    color.amber_strength,
                    Some((0.0, 1.0)),
                    "Share of red and green moved onto amber",
                ),
            },
            limits: LimitsConfigSchema {
                max_universe: ConfigOption::new(
                    defaults.limits.max_universe,
                    Some((1, MAX_UNIVERSE)),
                    "Highest universe the patch sheet allocates",
                ),
                max_patch_rows: ConfigOption::new(
                    defaults.limits.max_patch_rows,
                    Some((1, 100_000)),
                    "Rows generated for one patch sheet",
                ),
                max_power_units: ConfigOption::new(
                    defaults.limits.max_power_units,
                    Some((1, 100_000)),
                    "Units counted by one power estimate",
                ),
                max_circuits: ConfigOption::new(
                    defaults.limits.max_circuits,
                    Some((1, 1_000)),
                    "Circuits in one power estimate",
                ),
                max_phases: ConfigOption::new(
                    defaults.limits.max_phases,
                    Some((1, 3)),
                    "Supply phases in one power estimate",
                ),
            },
        }
    }

    /// Validate settings against schema
    pub fn validate_settings(settings: &ToolSettings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        let patch = &schema.patch;
        patch.channels_per_universe.check(
            "channels_per_universe",
            &settings.channels_per_universe,
            &mut errors,
        );
        patch
            .labels_per_page
            .check("labels_per_page", &settings.print.labels_per_page, &mut errors);
        if settings.fallback_name.trim().is_empty() {
            errors.push("fallback_name must not be empty".to_string());
        }

        let color = &schema.color;
        let values = &settings.color;
        color.default_kelvin.check("default_kelvin", &values.default_kelvin, &mut errors);
        color.white_threshold.check("white_threshold", &values.white_threshold, &mut errors);
        color.saturation_cutoff.check("saturation_cutoff", &values.saturation_cutoff, &mut errors);
        color.white_limit.check("white_limit", &values.white_limit, &mut errors);
        color.amber_hue_min.check("amber_hue_min", &values.amber_hue_min, &mut errors);
        color.amber_hue_max.check("amber_hue_max", &values.amber_hue_max, &mut errors);
        color
            .amber_min_saturation
            .check("amber_min_saturation", &values.amber_min_saturation, &mut errors);
        color.amber_strength.check("amber_strength", &values.amber_strength, &mut errors);
        if values.amber_hue_min >= values.amber_hue_max {
            errors.push("amber_hue_min must be below amber_hue_max".to_string());
        }

        let limits = &schema.limits;
        let values = &settings.limits;
        limits.max_universe.check("max_universe", &values.max_universe, &mut errors);
        limits.max_patch_rows.check("max_patch_rows", &values.max_patch_rows, &mut errors);
        limits.max_power_units.check("max_power_units", &values.max_power_units, &mut errors);
        limits.max_circuits.check("max_circuits", &values.max_circuits, &mut errors);
        limits.max_phases.check("max_phases", &values.max_phases, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_config_manager_new() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tools.json");

        let manager = ConfigManager::new(Some(config_path.clone()));
        assert_eq!(manager.config_path(), config_path);
        assert_eq!(manager.settings(), &ToolSettings::default());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("tools.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));
        let settings = manager.load().unwrap();
        assert_eq!(settings, ToolSettings::default());
        assert!(config_path.exists());
    }

    fn write_config(path: &Path, settings: &ToolSettings) {
        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: settings.clone(),
            created_at: String::new(),
            modified_at: String::new(),
        };
        fs::write(path, serde_json::to_string(&config_file).unwrap()).unwrap();
    }

    #[test]
    fn test_load_edited_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tools.json");

        let mut settings = ToolSettings::default();
        settings.channels_per_universe = 256;
        settings.fallback_name = "Lampe".to_string();
        settings.color.white_limit = 0.5;
        settings.limits.max_patch_rows = 2_000;
        write_config(&config_path, &settings);

        let mut manager = ConfigManager::new(Some(config_path));
        assert_eq!(manager.load().unwrap(), settings);
        assert_eq!(manager.settings(), &settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tools.json");
        fs::write(
            &config_path,
            r#"{"version":"0.0.0","settings":{"channelsPerUniverse":100},"created_at":"","modified_at":""}"#,
        )
        .unwrap();

        let mut manager = ConfigManager::new(Some(config_path));
        let settings = manager.load().unwrap();
        assert_eq!(settings.channels_per_universe, 100);
        assert_eq!(settings.fallback_name, "Fixture");
        assert_eq!(settings.color, ColorThresholds::default());
    }

    #[test]
    fn test_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tools.json");
        fs::write(&config_path, "not json").unwrap();

        let mut manager = ConfigManager::new(Some(config_path));
        assert!(matches!(manager.load(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_settings() {
        assert!(ConfigManager::validate_settings(&ToolSettings::default()).is_ok());

        let mut settings = ToolSettings::default();
        settings.channels_per_universe = 0;
        settings.color.white_limit = 1.5;
        settings.color.saturation_cutoff = f64::NAN;
        settings.fallback_name = " ".to_string();

        let errors = ConfigManager::validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&"channels_per_universe must be between 1 and 512".to_string()));
    }

    #[test]
    fn test_load_rejects_invalid_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tools.json");

        let mut settings = ToolSettings::default();
        settings.color.amber_hue_min = 70.0;
        write_config(&config_path, &settings);

        let mut manager = ConfigManager::new(Some(config_path));
        assert!(matches!(manager.load(), Err(ConfigError::ValidationError(_))));
        assert_eq!(manager.settings(), &ToolSettings::default());
    }

    #[test]
    fn test_limits_are_validated() {
        let mut settings = ToolSettings::default();
        settings.limits.max_universe = MAX_UNIVERSE + 1;
        settings.limits.max_patch_rows = 0;
        settings.limits.max_phases = 4;

        let errors = ConfigManager::validate_settings(&settings).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "max_universe must be between 1 and 32768".to_string(),
                "max_patch_rows must be between 1 and 100000".to_string(),
                "max_phases must be between 1 and 3".to_string(),
            ]
        );
    }
}
