use std::{
    fs::metadata,
    io,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// A local file picked for upload.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new<P: Into<PathBuf>, S: ToString>(path: P, name: S, size: u64) -> Self {
        Self {
            path: path.into(),
            name: name.to_string(),
            size,
        }
    }

    /// Reads name and size from disk, directories are rejected.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let path = path.as_ref();
        let metadata = metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = file_name(path).unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(path, name, metadata.len()))
    }
}

pub fn file_name<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
}
