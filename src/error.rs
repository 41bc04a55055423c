use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("invalid connector config: {0}")]
    InvalidConfig(String),
    #[error("invalid rect '{input}': expected x,y,width,height")]
    InvalidRect { input: String },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to rasterize frame: {0}")]
    Raster(String),
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
