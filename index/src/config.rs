//! Front-end configuration module.
//!
//! # Environment Variables
//! - `TREE_DATA_DIRECTORY`: Optional. Directory that index filenames entered
//!   at the prompt are resolved against. Defaults to ".".

use std::path::PathBuf;

/// Front-end configuration loaded from environment variables.
#[derive(Debug)]
pub struct IndexConfig {
    /// Directory index files are created in and opened from.
    pub data_directory: PathBuf,
}

impl IndexConfig {
    /// Default data directory if `TREE_DATA_DIRECTORY` is not set.
    const DEFAULT_DATA_DIRECTORY: &'static str = ".";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if `TREE_DATA_DIRECTORY` is set
    /// but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_directory = match std::env::var_os("TREE_DATA_DIRECTORY") {
            Some(dir) if dir.is_empty() => {
                return Err(ConfigError::InvalidValue {
                    name: "TREE_DATA_DIRECTORY",
                    reason: "must not be empty",
                });
            }
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(Self::DEFAULT_DATA_DIRECTORY),
        };

        Ok(Self { data_directory })
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from(Self::DEFAULT_DATA_DIRECTORY),
        }
    }
}

/// Error returned when configuration loading fails.
#[derive(Debug)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue {
        /// Name of the environment variable.
        name: &'static str,
        /// Description of why the value is invalid.
        reason: &'static str,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, reason } => {
                write!(f, "invalid value for environment variable {name}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_directory() {
        let config = IndexConfig::default();
        assert_eq!(config.data_directory, PathBuf::from("."));
    }

    #[test]
    fn test_config_error_display() {
        let invalid = ConfigError::InvalidValue {
            name: "TEST_VAR",
            reason: "must be good",
        };
        assert_eq!(
            invalid.to_string(),
            "invalid value for environment variable TEST_VAR: must be good"
        );
    }
}
