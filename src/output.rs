//! Generated artifact files: full replace on write, parent directories created.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::temples::ModuleError;

#[derive(Debug)]
pub enum OutputError {
    Read(PathBuf, std::io::Error),
    Write(PathBuf, std::io::Error),
    Module(PathBuf, ModuleError),
    Serialize(serde_json::Error),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(path, err) => write!(f, "failed to read {}: {err}", path.display()),
            Self::Write(path, err) => write!(f, "failed to write {}: {err}", path.display()),
            Self::Module(path, err) => write!(f, "failed to parse {}: {err}", path.display()),
            Self::Serialize(err) => write!(f, "failed to serialize output: {err}"),
        }
    }
}

impl std::error::Error for OutputError {}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

/// Replaces `path` with `contents`.
pub fn write_artifact(path: &Path, contents: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OutputError::Write(parent.to_path_buf(), e))?;
    }
    fs::write(path, contents).map_err(|e| OutputError::Write(path.to_path_buf(), e))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}
