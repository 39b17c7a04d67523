//! Configuration loading
//!
//! The whole crate is configured from a single TOML file. Every section and
//! every field is optional and falls back to the defaults of the matching
//! config struct:
//!
//! ```toml
//! controller = "geometric"
//!
//! [geometric]
//! turning_radius = 40.0
//! goal_heading = "face_goal"
//! ```

use std::fs::read_to_string;
use std::path::Path;

use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::common::ControlResult;
use crate::control::{BatchConfig, ControllerKind};
use crate::path_planning::GeometricConfig;
use crate::path_tracking::FeedbackConfig;

/// An error that occurs while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot load the configuration file: {0}")]
    FileLoad(#[from] std::io::Error),

    #[error("Cannot read the configuration file: {0}")]
    Deserialise(#[from] toml::de::Error),
}

/// Top level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JourneyControlConfig {
    /// Strategy selected at start-up
    pub controller: ControllerKind,
    pub feedback: FeedbackConfig,
    pub geometric: GeometricConfig,
    pub batch: BatchConfig,
}

impl JourneyControlConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Check every section, including the ones of the inactive controller
    pub fn validate(&self) -> ControlResult<()> {
        self.feedback.validate()?;
        self.geometric.validate()
    }
}

/// Load and validate a configuration file
pub fn load<P: AsRef<Path>>(path: P) -> ControlResult<JourneyControlConfig> {
    let path = path.as_ref();
    let text = read_to_string(path).map_err(ConfigError::from)?;
    let config = JourneyControlConfig::from_toml_str(&text)?;
    config.validate()?;

    info!("Loaded configuration from {:?}", path);
    Ok(config)
}
