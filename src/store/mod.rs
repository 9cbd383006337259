//! Flat-file persistence.
//!
//! One registry CSV for all events plus three files per event, all under the
//! configured data directory.

mod repository;
mod table;

pub use repository::*;

use std::path::{Path, PathBuf};

use crate::errors::AppError;

const REGISTRY_FILE: &str = "events.csv";

/// File names for the registry and the per-event files.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    pub fn responses(&self, event_id: &str) -> PathBuf {
        self.root.join(format!("responses_{}.csv", event_id))
    }

    pub fn dates(&self, event_id: &str) -> PathBuf {
        self.root.join(format!("dates_{}.txt", event_id))
    }

    pub fn order(&self, event_id: &str) -> PathBuf {
        self.root.join(format!("order_{}.txt", event_id))
    }
}

/// Event ids are generated as lowercase hex; anything else cannot name a file
/// we wrote.
pub fn is_valid_event_id(event_id: &str) -> bool {
    !event_id.is_empty()
        && event_id.len() <= 32
        && event_id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Replace a file's contents without exposing a half-written file to readers.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AppError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Internal(format!("Bad storage path {}", path.display())))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Read a file, mapping a missing file to `None`.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, AppError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read a file that must belong to an existing event.
async fn read_event_file(path: &Path) -> Result<Vec<u8>, AppError> {
    read_optional(path)
        .await?
        .ok_or_else(AppError::event_not_found)
}

fn utf8(bytes: Vec<u8>, path: &Path) -> Result<String, AppError> {
    String::from_utf8(bytes)
        .map_err(|_| AppError::DataCorruption(format!("{} is not valid UTF-8", path.display())))
}
