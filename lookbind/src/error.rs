use crate::{bind::ResolveError, model};
use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// What is wrong with a filesystem path.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PathProblem {
    NotFound,
    NotADirectory,
    NotAFile,
}

impl fmt::Display for PathProblem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathProblem::NotFound => write!(f, "does not exist"),
            PathProblem::NotADirectory => write!(f, "is not a directory"),
            PathProblem::NotAFile => write!(f, "is not a file"),
        }
    }
}

/// Errors of the binding engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or conflicting inputs.
    #[error("{0}")]
    Configuration(String),
    /// A required file or folder is missing or has the wrong type.
    #[error("`{}` {problem}", .path.display())]
    Path { path: PathBuf, problem: PathProblem },
    /// The texture folder is unusable or the textures of a material are ambiguous.
    #[error(transparent)]
    Resolution(#[from] ResolveError),
    /// A scene document operation failed.
    #[error(transparent)]
    Document(#[from] model::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// An error with additional context.
    #[error("{source}\n  context: {msg}")]
    Context { msg: String, source: Box<Error> },
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Error {
        Error::Configuration(msg.into())
    }

    pub fn path(path: impl Into<PathBuf>, problem: PathProblem) -> Error {
        Error::Path {
            path: path.into(),
            problem,
        }
    }

    pub fn context(self, info: impl Into<String>) -> Error {
        Error::Context {
            source: Box::new(self),
            msg: info.into(),
        }
    }

    /// Name of the failure category, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration error",
            Error::Path { .. } => "path error",
            Error::Resolution(_) => "resolution error",
            Error::Document(_) => "document error",
            Error::Io(_) => "I/O error",
            Error::Context { source, .. } => source.kind(),
        }
    }
}

pub trait ErrorContextExt<T> {
    fn context(self, info: impl Into<String>) -> Result<T, Error>;
}

impl<T, E: Into<Error>> ErrorContextExt<T> for Result<T, E> {
    fn context(self, info: impl Into<String>) -> Result<T, Error> {
        self.map_err(|e| Into::<Error>::into(e).context(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind() {
        let result: Result<(), ResolveError> = Err(ResolveError::FolderNotFound(PathBuf::from("/nope")));
        let err = result.context("material `rock`").context("asset `/rock`").unwrap_err();
        assert_eq!(err.kind(), "resolution error");
        let msg = err.to_string();
        assert!(msg.contains("/nope"));
        assert!(msg.contains("material `rock`"));
        assert!(msg.contains("asset `/rock`"));
    }
}
