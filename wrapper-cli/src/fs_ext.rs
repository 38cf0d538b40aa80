use std::{fs::File, path::Path};

use crate::error::{Error, Result};

pub fn read_file_to_string(path: impl AsRef<Path>) -> Result<String> {
    std::fs::read_to_string(&path).map_err(|source| Error::ReadFile {
        source,
        path: path.as_ref().into(),
    })
}

/// Opens `path` for appending, creating it if needed.
pub fn open_append(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    File::options()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| Error::OpenFile {
            source,
            path: path.to_owned(),
        })
}
