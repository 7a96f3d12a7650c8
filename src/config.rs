use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the config file for the viewer and the CLI.
pub const CONFIG_ENV_VAR: &str = "FLAME_CONFIG";

/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "flame.json";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Instrument and analysis constants.
///
/// None of the four analysis constants has a built-in default: a config
/// file that omits one of them fails to parse.
///
/// ```json
/// {
///   "nr_pixels": 3669,
///   "integration_time_limit": 65000,
///   "lower_boundary": 40000,
///   "upper_boundary": 60000,
///   "encoding": "utf-8"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Expected number of spectral samples in a well-formed measurement.
    pub nr_pixels: usize,
    /// Integration time cap in microseconds; changes to or above it are not scored.
    pub integration_time_limit: i64,
    /// Inclusive lower bound of the target peak range.
    pub lower_boundary: i32,
    /// Exclusive upper bound of the target peak range.
    pub upper_boundary: i32,
    /// WHATWG label of the text encoding of measurement files.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Wavelength in nm of every pixel, used as the plot x axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelengths: Option<Vec<f64>>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl AnalysisConfig {
    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Config path from `FLAME_CONFIG`, else `flame.json` if it exists.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(p) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(p));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.is_file().then_some(local)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nr_pixels == 0 {
            return Err(ConfigError::Invalid("nr_pixels must be positive".into()));
        }
        if self.integration_time_limit <= 0 {
            return Err(ConfigError::Invalid(
                "integration_time_limit must be positive".into(),
            ));
        }
        if self.lower_boundary >= self.upper_boundary {
            return Err(ConfigError::Invalid(format!(
                "lower_boundary ({}) must be below upper_boundary ({})",
                self.lower_boundary, self.upper_boundary
            )));
        }
        self.text_encoding()?;
        if let Some(w) = &self.wavelengths {
            if w.len() != self.nr_pixels {
                return Err(ConfigError::Invalid(format!(
                    "{} wavelengths given for {} pixels",
                    w.len(),
                    self.nr_pixels
                )));
            }
        }
        Ok(())
    }

    /// Resolve the configured encoding label.
    pub fn text_encoding(&self) -> Result<&'static Encoding, ConfigError> {
        Encoding::for_label(self.encoding.as_bytes())
            .ok_or_else(|| ConfigError::Invalid(format!("unknown encoding '{}'", self.encoding)))
    }

    /// Whether a peak value lies in `[lower_boundary, upper_boundary)`.
    pub fn in_target_range(&self, value: i32) -> bool {
        self.lower_boundary <= value && value < self.upper_boundary
    }
}
