//! The generated-file abstraction.
//!
//! A [`File`] knows *what* to write (its sections) and *where* (its output path relative to the writer directory).
//! Path selection receives the set of paths the current [`Writer`](crate::Writer) session already wrote so a file can
//! move out of the way or refuse; [`resolve_path`] implements both strategies.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::namespace::Namespace;
use crate::section::Section;

/// Highest numeric suffix tried by [`CollisionPolicy::Suffix`].
pub const MAX_SUFFIX: usize = 100;

/// A file that can be written by a [`Writer`](crate::Writer).
pub trait File {
    /// Ordered sections making up the file content.
    ///
    /// `namespace` identifies the module the file is written into, so sections can render `crate::...` imports of
    /// sibling generated modules.
    fn sections(&self, namespace: &Namespace) -> Vec<Section>;

    /// Path of the file relative to the writer directory.
    ///
    /// Must be a pure function of `reserved` and must never return a member of `reserved`.
    fn output_path(&self, reserved: &BTreeSet<PathBuf>) -> Result<PathBuf, PathConflict>;
}

/// No output path is available for a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("output path `{}` is already taken in this session", path.display())]
pub struct PathConflict {
    /// The file's natural (preferred) path.
    pub path: PathBuf,
}

/// What a file does when its natural path is already reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Refuse with [`PathConflict`].
    #[default]
    Fail,
    /// Try `name_2.ext`, `name_3.ext`, ... up to [`MAX_SUFFIX`].
    Suffix,
}

/// Pick the output path for a file whose preferred path is `natural`.
pub fn resolve_path(
    natural: impl Into<PathBuf>,
    reserved: &BTreeSet<PathBuf>,
    policy: CollisionPolicy,
) -> Result<PathBuf, PathConflict> {
    let natural = natural.into();
    if !reserved.contains(&natural) {
        return Ok(natural);
    }

    match policy {
        CollisionPolicy::Fail => Err(PathConflict { path: natural }),
        CollisionPolicy::Suffix => {
            let free = (2..=MAX_SUFFIX)
                .map(|n| suffixed(&natural, n))
                .find(|candidate| !reserved.contains(candidate));
            free.ok_or(PathConflict { path: natural })
        }
    }
}

fn suffixed(path: &Path, n: usize) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };
    path.with_file_name(name)
}
