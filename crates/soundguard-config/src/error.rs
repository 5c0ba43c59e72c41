use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration sources: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing asset: {}", .path.display())]
    MissingAsset { path: PathBuf },

    #[error("Could not locate install root: {0}")]
    InstallRoot(String),
}
