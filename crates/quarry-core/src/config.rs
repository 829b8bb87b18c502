//! Runtime configuration.
//!
//! Loaded once at process start and handed to [`Context::from_config`].
//!
//! [`Context::from_config`]: crate::context::Context::from_config

use crate::{
    error::{ErrorClass, ErrorOrigin},
    path::DEFAULT_ADAPTER,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("default_adapter must not be empty")]
    EmptyDefaultAdapter,
}

impl ConfigError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Invalid
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        ErrorOrigin::Config
    }
}

///
/// Config
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Adapter segment used for references that do not name one.
    pub default_adapter: String,

    /// Install the built-in comparison validators on startup.
    pub builtin_validators: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_adapter: DEFAULT_ADAPTER.to_string(),
            builtin_validators: true,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_adapter.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultAdapter);
        }

        Ok(())
    }
}
