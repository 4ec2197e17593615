//! Staging directories for drivers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::GenerateError;

/// Prefix of every staging directory name.
pub const PREFIX: &str = "designgen";

/// A uniquely named cargo package directory holding one driver.
///
/// The directory outlives this value: it is only deleted by [`Workspace::remove`], so failed runs leave it behind for
/// inspection.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    /// Create a fresh directory below `work_dir` and write the driver manifest into it.
    pub fn create(work_dir: &Path, manifest: &str) -> Result<Self, GenerateError> {
        let io_error = |source| GenerateError::Workspace {
            dir: work_dir.to_path_buf(),
            source,
        };
        fs::create_dir_all(work_dir).map_err(io_error)?;
        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(work_dir)
            .map_err(io_error)?
            .keep();

        fs::write(dir.join("Cargo.toml"), manifest).map_err(|source| GenerateError::Workspace {
            dir: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn remove(self) -> io::Result<()> {
        fs::remove_dir_all(&self.dir)
    }
}
