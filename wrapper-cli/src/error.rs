use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("error reading file {path}: {source}")]
    ReadFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("error opening file {path}: {source}")]
    OpenFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("error indexing collection at index {index}: {msg}")]
    BadIndex { index: usize, msg: &'static str },

    #[error("invalid key binding: {0:?}")]
    KeyBinding(String),

    #[error("error deserializing TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    Core(#[from] wrapper_core::Error),
}
