use std::io;
use std::path::PathBuf;

use cardio_infer::PipelineError;
use cardio_model::ModelError;
use cardio_schema::RawInputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to read from stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("invalid config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid input: {0}")]
    Input(#[from] RawInputError),
    #[error("no model given (pass --model or set `model` in cardio.toml)")]
    NoModel,
    #[error("failed to load model '{}': {source}", path.display())]
    Model { path: PathBuf, source: ModelError },
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// 1 when the model or the request failed, 2 for usage and configuration problems.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Model { .. } | CliError::Pipeline(_) => 1,
            _ => 2,
        }
    }
}
