use crate::model::{Path, ValueType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no object at `{0}`")]
    NoObjectAtPath(Path),
    #[error("mismatched attribute types on `{path}`: declared `{expected}`, got `{actual}`")]
    MismatchedTypes {
        path: Path,
        expected: ValueType,
        actual: ValueType,
    },
    #[error("invalid path syntax: `{0}`")]
    PathSyntax(String),
    #[error("cannot remove the root prim")]
    RemoveRoot,
    #[error("asset path is not valid UTF-8: `{}`", .0.display())]
    NonUtf8AssetPath(std::path::PathBuf),
    #[error("read error: {0}")]
    ReadError(#[from] crate::model::ReadError),
    #[error("file error: {0:#}")]
    FileError(#[from] anyhow::Error),
}
