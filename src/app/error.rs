use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures that abort a build. Config and optional-source problems are
/// recovered where they happen and never reach this type.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Error walking source tree: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Filesystem error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSS error in {}: {message}", path.display())]
    Css { path: PathBuf, message: String },

    #[error("Sass compile error in {}: {message}", path.display())]
    Sass { path: PathBuf, message: String },

    #[error("JavaScript error in {}: {message}", path.display())]
    Js { path: PathBuf, message: String },

    #[error("Build stage '{stage}' panicked")]
    TaskPanicked { stage: &'static str },
}

impl BuildError {
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
