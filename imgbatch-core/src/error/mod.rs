use std::path::PathBuf;

use thiserror::Error;

/// Invalid user-supplied configuration. Always fatal, raised before any
/// request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid size format: '{0}'. Expected WxH (e.g., 512x512)")]
    InvalidSize(String),
    #[error("invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("unable to build request URL for prompt: {0}")]
    RequestUrl(String),
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("the prompt is empty. Provide a prompt string, a file path, or '-' for stdin")]
    EmptyPrompts,
    #[error("count must be at least 1")]
    ZeroCount,
    #[error(
        "for multiple image generation (batch or count > 1), --output must be a directory, not a file: {}",
        .0.display()
    )]
    OutputIsFile(PathBuf),
}
