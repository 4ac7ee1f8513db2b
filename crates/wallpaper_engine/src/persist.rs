//! Writing finished wallpapers into the export directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

const PARTIAL_PREFIX: &str = ".wallpaper-";
const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} exists and is not a directory")]
    NotADirectory(PathBuf),
    #[error("could not create {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("refusing to write {0:?}: file names must not contain path separators")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Create `dir` (and parents) unless it already exists as a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(PersistError::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes each export to a hidden `.part` file first, then renames it into place,
/// so readers never see a truncated PNG.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the final path. An existing file with the same name is replaced.
    pub fn write(
        &self,
        filename: &str,
        content: impl AsRef<[u8]>,
    ) -> Result<PathBuf, PersistError> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(PersistError::InvalidName(filename.to_string()));
        }
        ensure_output_dir(&self.dir)?;

        let mut partial = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(&self.dir)?;
        partial.write_all(content.as_ref())?;
        partial.as_file().sync_all()?;

        let target = self.dir.join(filename);
        partial.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}
