//! `cardio.toml`: defaults for the `predict` command.
//!
//! ```toml
//! model = "models/heart-lr.json"
//! format = "json"
//! fill_defaults = true
//! strict_fields = false
//! explain = 3
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CliError;

pub const DEFAULT_CONFIG: &str = "cardio.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Model artifact; relative paths resolve against the config file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<PathBuf>,
    pub format: OutputFormat,
    /// Fill fields absent from the input with the form defaults.
    pub fill_defaults: bool,
    /// Reject input keys that are not part of the schema.
    pub strict_fields: bool,
    /// Number of top feature contributions to report, 0 for none.
    pub explain: usize,
}

impl Config {
    pub fn parse(text: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from an explicit path, or from `cardio.toml` in the working
    /// directory when present. An explicit path that cannot be read is an
    /// error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Config, CliError> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG));
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if explicit.is_none() && e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no {DEFAULT_CONFIG} found, using built-in defaults");
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(CliError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut config = Config::parse(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        if let (Some(model), Some(dir)) = (&config.model, path.parent()) {
            if model.is_relative() {
                config.model = Some(dir.join(model));
            }
        }
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
