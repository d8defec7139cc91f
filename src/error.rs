use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no image found under '{0}'")]
    Missing(String),
    #[error("unable to decode image [{file}]: {reason}")]
    Undecodable { file: PathBuf, reason: String },
    #[error("error loading image [{file}]")]
    Io {
        file: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("line {line}: malformed entry '{text}'")]
    InvalidLine { line: usize, text: String },
    #[error("line {line}: manifest already contains '{name}'")]
    DuplicateName { line: usize, name: String },
}
