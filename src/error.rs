use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error at {path}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed JSON in {path} (line {line}): {source}")]
    JsonAt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Model error: {0}")]
    Model(String),
}

impl PipelineError {
    /// Attach a path to an I/O failure
    pub fn io_at(path: &Path, source: std::io::Error) -> Self {
        Self::IoAt {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn query<E: std::fmt::Display>(msg: E) -> Self {
        Self::Query(msg.to_string())
    }

    pub fn database<E: std::fmt::Display>(err: E) -> Self {
        Self::Database(err.to_string())
    }

    pub fn model<E: std::fmt::Display>(msg: E) -> Self {
        Self::Model(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_at_mentions_path() {
        let err = PipelineError::io_at(
            Path::new("data/loans/1.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("data/loans/1.json"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(PipelineError::query("bad"), PipelineError::Query(m) if m == "bad"));
        assert!(matches!(
            PipelineError::database("down"),
            PipelineError::Database(m) if m == "down"
        ));
        assert!(matches!(PipelineError::model("unfit"), PipelineError::Model(_)));
    }
}
