use std::path::PathBuf;

use thiserror::Error;

/// Failures of the durable key-value store.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to read preferences file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize preferences to TOML")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write preferences file: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejections from the city input path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("City name must not be empty")]
    EmptyCity,
}
