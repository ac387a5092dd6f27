//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dialogtree/dialogtree.toml`
//! 3. Explicit config file (`--config FILE`)
//! 4. Environment variables: `DIALOGTREE_*` prefix, `__` between sections

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::services::Pacing;
use crate::application::{ApplicationError, FormatOptions};

const ENV_PREFIX: &str = "DIALOGTREE";

/// Largest accepted `playback.time_scale`.
pub const MAX_TIME_SCALE: f64 = 10.0;

/// Walkthrough timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Pause before each branch, in milliseconds
    pub branch_pause_ms: u64,
    /// Scale of the per-line pause, `ceil(ln(chars) * time_scale)` seconds
    pub time_scale: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            branch_pause_ms: 1000,
            time_scale: 0.1,
        }
    }
}

/// Layout of written dialog files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Spaces per indentation level
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Raw playback config: `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPlaybackConfig {
    pub branch_pause_ms: Option<u64>,
    pub time_scale: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub indent: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub playback: RawPlaybackConfig,
    pub output: RawOutputConfig,
}

/// Unified configuration for dialogtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackConfig,
    pub output: OutputConfig,
}

/// Get the XDG config directory for dialogtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dialogtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dialogtree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            playback: PlaybackConfig {
                branch_pause_ms: overlay
                    .playback
                    .branch_pause_ms
                    .unwrap_or(self.playback.branch_pause_ms),
                time_scale: overlay.playback.time_scale.unwrap_or(self.playback.time_scale),
            },
            output: OutputConfig {
                indent: overlay.output.indent.unwrap_or(self.output.indent),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// An explicit file must exist; the global file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("config: global {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = explicit {
            debug!("config: explicit {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current, Environment::with_prefix(ENV_PREFIX))?;
        current.validate()?;
        Ok(current)
    }

    /// Apply DIALOGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env.prefix_separator("_").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Some(val) = optional(config.get_int("playback.branch_pause_ms"))? {
            settings.playback.branch_pause_ms =
                u64::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("playback.branch_pause_ms must not be negative: {val}"),
                })?;
        }
        if let Some(val) = optional(config.get_float("playback.time_scale"))? {
            settings.playback.time_scale = val;
        }
        if let Some(val) = optional(config.get_int("output.indent"))? {
            settings.output.indent = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("output.indent must not be negative: {val}"),
            })?;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        let scale = self.playback.time_scale;
        if !(0.0..=MAX_TIME_SCALE).contains(&scale) {
            return Err(ApplicationError::Config {
                message: format!(
                    "playback.time_scale must be between 0 and {MAX_TIME_SCALE}: {scale}"
                ),
            });
        }
        Ok(())
    }

    /// Walkthrough pacing derived from the playback section.
    pub fn pacing(&self) -> Pacing {
        Pacing {
            branch_pause: Duration::from_millis(self.playback.branch_pause_ms),
            time_scale: self.playback.time_scale,
        }
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            indent: self.output.indent,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

/// Missing keys are not an error; malformed values are.
fn optional<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map.into_iter().collect()))
    }

    #[test]
    fn given_defaults_when_converting_then_matches_walkthrough_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pacing(), Pacing::default());
        assert_eq!(settings.format_options(), FormatOptions::default());
    }

    #[test]
    fn given_explicit_file_when_merging_then_only_specified_values_change() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dialogtree.toml");
        std::fs::write(&path, "[playback]\ntime_scale = 0.5\n").unwrap();

        let merged = Settings::default().merge_with(&load_raw_settings(&path).unwrap());

        assert_eq!(merged.playback.time_scale, 0.5);
        assert_eq!(merged.playback.branch_pause_ms, 1000);
        assert_eq!(merged.output.indent, 2);
    }

    #[test]
    fn given_invalid_toml_when_loading_then_config_error_names_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        std::fs::write(&path, "[playback\n").unwrap();

        let err = load_raw_settings(&path).unwrap_err();

        assert!(matches!(err, ApplicationError::Config { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn given_env_vars_when_overriding_then_they_win() {
        let env = env_with(&[
            ("DIALOGTREE_PLAYBACK__BRANCH_PAUSE_MS", "0"),
            ("DIALOGTREE_OUTPUT__INDENT", "4"),
        ]);

        let settings = Settings::apply_env_overrides(Settings::default(), env).unwrap();

        assert_eq!(settings.playback.branch_pause_ms, 0);
        assert_eq!(settings.output.indent, 4);
        assert_eq!(settings.playback.time_scale, 0.1);
    }

    #[test]
    fn given_negative_indent_in_env_when_overriding_then_fails() {
        let env = env_with(&[("DIALOGTREE_OUTPUT__INDENT", "-1")]);
        assert!(Settings::apply_env_overrides(Settings::default(), env).is_err());
    }

    #[rstest]
    #[case(-1.0)]
    #[case(MAX_TIME_SCALE + 0.5)]
    #[case(1e20)]
    #[case(f64::INFINITY)]
    #[case(f64::NAN)]
    fn given_time_scale_out_of_range_when_validating_then_fails(#[case] scale: f64) {
        let mut settings = Settings::default();
        settings.playback.time_scale = scale;

        let err = settings.validate().unwrap_err();

        assert!(err.to_string().contains("playback.time_scale"));
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.1)]
    #[case(MAX_TIME_SCALE)]
    fn given_time_scale_in_range_when_validating_then_ok(#[case] scale: f64) {
        let mut settings = Settings::default();
        settings.playback.time_scale = scale;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn given_huge_time_scale_in_env_when_validating_then_rejected() {
        let env = env_with(&[("DIALOGTREE_PLAYBACK__TIME_SCALE", "1e20")]);

        let settings = Settings::apply_env_overrides(Settings::default(), env).unwrap();

        assert_eq!(settings.playback.time_scale, 1e20);
        assert!(matches!(settings.validate(), Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_settings_when_rendering_toml_then_lists_sections() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("[playback]"));
        assert!(toml.contains("branch_pause_ms = 1000"));
        assert!(toml.contains("[output]"));
    }
}
