use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Failed to read directory {path:?}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Chart(#[from] ChartError),
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to create chart directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to draw chart {chart}: {reason}")]
    Draw { chart: &'static str, reason: String },

    #[error("Failed to write chart {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Bundled chart font could not be loaded")]
    Font,
}
