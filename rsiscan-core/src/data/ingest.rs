//! Folder ingestion: discover raw CSV exports and name their stocks.
//!
//! Discovery is lazy. `Ingestor::scan` checks the folder once, then the
//! returned `StockFiles` iterator reads directory entries on demand, yielding
//! one item per `*.csv` file (case-insensitive). A file whose name breaks the
//! naming convention yields an `Err` for that entry only.

use crate::domain::stock::{has_csv_extension, FileNameError, StockId};
use serde::{Deserialize, Serialize};
use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A raw export and the stock it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockFile {
    pub stock: StockId,
    pub path: PathBuf,
}

/// Stateless folder scanner.
pub struct Ingestor;

impl Ingestor {
    /// Open `folder` for scanning.
    ///
    /// Fails once, up front, if the folder is missing, is not a directory,
    /// or cannot be listed. Entry paths are absolute when the folder can be
    /// canonicalized.
    pub fn scan(folder: &Path) -> Result<StockFiles, IngestError> {
        if !folder.exists() {
            return Err(IngestError::FolderNotFound {
                path: folder.to_path_buf(),
            });
        }
        if !folder.is_dir() {
            return Err(IngestError::NotADirectory {
                path: folder.to_path_buf(),
            });
        }

        let folder = fs::canonicalize(folder).unwrap_or_else(|_| folder.to_path_buf());
        let entries = fs::read_dir(&folder).map_err(|source| IngestError::Unreadable {
            path: folder.clone(),
            source,
        })?;

        debug!(folder = %folder.display(), "scanning for raw exports");
        Ok(StockFiles { folder, entries })
    }
}

/// Lazy sequence of raw exports found in one folder.
#[derive(Debug)]
pub struct StockFiles {
    folder: PathBuf,
    entries: ReadDir,
}

impl StockFiles {
    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl Iterator for StockFiles {
    type Item = Result<StockFile, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(IngestError::Unreadable {
                        path: self.folder.clone(),
                        source,
                    }))
                }
            };

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!(entry = ?file_name, "skipping entry with non UTF-8 name");
                continue;
            };
            if !has_csv_extension(name) {
                continue;
            }

            let path = entry.path();
            if !path.is_file() {
                debug!(path = %path.display(), "skipping non-file entry");
                continue;
            }

            return Some(
                StockId::from_file_name(name)
                    .map(|stock| StockFile {
                        stock,
                        path: path.clone(),
                    })
                    .map_err(|source| IngestError::FileName { path, source }),
            );
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("folder path doesn't exist: {}", .path.display())]
    FolderNotFound { path: PathBuf },

    #[error("folder path is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("cannot list folder {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    FileName {
        path: PathBuf,
        #[source]
        source: FileNameError,
    },
}

impl IngestError {
    /// The file or folder the error concerns.
    pub fn path(&self) -> &Path {
        match self {
            Self::FolderNotFound { path }
            | Self::NotADirectory { path }
            | Self::Unreadable { path, .. }
            | Self::FileName { path, .. } => path,
        }
    }

    /// True for errors that make the whole folder unusable.
    pub fn is_folder_error(&self) -> bool {
        !matches!(self, Self::FileName { .. })
    }
}
