//! Configuration management for Skiff.
//!
//! Parses `skiff.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `output.dir`
//! - `output.extension`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override nesting limit.
    pub max_depth: Option<usize>,
    /// Override input size limit.
    pub max_input_bytes: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "skiff.toml";

/// Default input size limit (1 MiB).
const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Default list and blockquote nesting limit.
const DEFAULT_MAX_DEPTH: usize = 32;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering limits.
    pub render: RenderConfig,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Inputs larger than this many bytes are rejected.
    pub max_input_bytes: usize,
    /// How deep lists and blockquotes are processed recursively.
    pub max_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    extension: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug)]
pub struct OutputConfig {
    /// Directory rendered files are written to. `None` means stdout.
    pub dir: Option<PathBuf>,
    /// Extension of rendered files, without the dot.
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            extension: "html".to_owned(),
        }
    }
}

impl OutputConfig {
    /// Output path for a source file, or `None` when writing to stdout.
    #[must_use]
    pub fn target_for(&self, source: &Path) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let mut name = source.file_stem().unwrap_or(source.as_os_str()).to_os_string();
        name.push(".");
        name.push(&self.extension);
        Some(dir.join(name))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.dir`").
        field: String,
        /// Error message (e.g., "${`SKIFF_OUT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `skiff.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir = Some(output_dir.clone());
        }
        if let Some(max_depth) = settings.max_depth {
            self.render.max_depth = max_depth;
        }
        if let Some(max_input_bytes) = settings.max_input_bytes {
            self.render.max_input_bytes = max_input_bytes;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_output()?;
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        const MAX_DEPTH_LIMIT: usize = 1000;

        if self.render.max_input_bytes == 0 {
            return Err(ConfigError::Validation(
                "render.max_input_bytes must be greater than 0".to_owned(),
            ));
        }
        if self.render.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "render.max_depth cannot exceed {MAX_DEPTH_LIMIT}"
            )));
        }
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        let extension = &self.output_resolved.extension;
        require_non_empty(extension, "output.extension")?;
        if extension.starts_with('.') || extension.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "output.extension must be a bare extension such as \"html\"".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.output.dir {
            self.output.dir = Some(expand::expand_env(dir, "output.dir")?);
        }
        if let Some(ref extension) = self.output.extension {
            self.output.extension = Some(expand::expand_env(extension, "output.extension")?);
        }
        Ok(())
    }

    /// Resolve the output directory relative to the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = OutputConfig::default();
        self.output_resolved = OutputConfig {
            dir: self.output.dir.as_deref().map(|dir| config_dir.join(dir)),
            extension: self.output.extension.clone().unwrap_or(defaults.extension),
        };
    }
}
