//! Explicit configuration handed to paste tasks at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_COMMAND_LIMIT: u32 = 64;
const DEFAULT_SETBLOCK_COMMAND: &str = "setblock";
const DEFAULT_MAX_PROGRESS_LINES: usize = 10;

/// Tunables that govern how a paste is streamed to the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasteConfig {
    command_limit: u32,
    setblock_command: String,
    max_progress_lines: usize,
}

impl PasteConfig {
    /// Creates a configuration from explicit values, validating them.
    pub fn new(
        command_limit: u32,
        setblock_command: impl Into<String>,
        max_progress_lines: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            command_limit,
            setblock_command: setblock_command.into(),
            max_progress_lines,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants every task relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_limit == 0 {
            return Err(ConfigError::ZeroCommandLimit);
        }

        let name = self.setblock_command.as_str();
        if name.is_empty() {
            return Err(ConfigError::EmptyCommandName);
        }
        if name.starts_with('/') || name.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidCommandName(name.to_owned()));
        }

        Ok(())
    }

    /// Maximum number of commands transmitted per step.
    #[must_use]
    pub const fn command_limit(&self) -> u32 {
        self.command_limit
    }

    /// Name of the command used to set a single cell, without the leading slash.
    #[must_use]
    pub fn setblock_command(&self) -> &str {
        &self.setblock_command
    }

    /// Maximum number of chunk lines shown under the progress header.
    #[must_use]
    pub const fn max_progress_lines(&self) -> usize {
        self.max_progress_lines
    }
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            command_limit: DEFAULT_COMMAND_LIMIT,
            setblock_command: DEFAULT_SETBLOCK_COMMAND.to_owned(),
            max_progress_lines: DEFAULT_MAX_PROGRESS_LINES,
        }
    }
}

/// Reasons a paste configuration may be rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    #[error("could not parse paste configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A per-step budget of zero would never make progress.
    #[error("command limit must be at least 1")]
    ZeroCommandLimit,
    /// No command name was configured.
    #[error("setblock command name must not be empty")]
    EmptyCommandName,
    /// The command name contains a slash prefix or whitespace.
    #[error("setblock command name '{0}' must be a bare word without a leading slash")]
    InvalidCommandName(String),
}
