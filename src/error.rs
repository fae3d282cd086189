use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading map data or configuration.
/// Rendering itself never fails; it skips what it cannot draw.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("no usable map features in {path}")]
    NoData { path: PathBuf },
}

impl MapError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    pub fn json(path: &Path, source: simd_json::Error) -> Self {
        Self::Json { path: path.to_path_buf(), source }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn no_data(path: &Path) -> Self {
        Self::NoData { path: path.to_path_buf() }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = MapError::config("batch_capacity must be at least 16");
        assert_eq!(err.to_string(), "configuration error: batch_capacity must be at least 16");

        let err = MapError::no_data(Path::new("roads.geojson"));
        assert_eq!(err.to_string(), "no usable map features in roads.geojson");
    }
}
