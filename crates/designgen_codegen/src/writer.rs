//! Output writer sessions.
//!
//! A [`Writer`] owns a base directory and the registry of paths written through it. Each write asks the file for a
//! path given the registry, renders the file's sections into it, and normalizes Rust output. A path enters the
//! registry only once its file is completely written, so a failed write can be retried by the caller.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, BufWriter, Write as _};
use std::path::{Component, Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::file::{File, PathConflict};
use crate::namespace::{Namespace, NamespaceError};
use crate::normalize::{NormalizeError, normalize_file};
use crate::section::RenderError;

/// Errors from [`Writer::write`].
#[derive(Debug, Error, Diagnostic)]
pub enum WriteError {
    #[error(transparent)]
    #[diagnostic(code(designgen::write::conflict))]
    Conflict(#[from] PathConflict),

    #[error("output path `{}` must be relative and stay inside the output directory", path.display())]
    #[diagnostic(code(designgen::write::escapes))]
    Escapes { path: PathBuf },

    #[error("cannot write `{}`: {source}", path.display())]
    #[diagnostic(code(designgen::write::io))]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    #[diagnostic(code(designgen::write::namespace))]
    Namespace(#[from] NamespaceError),

    #[error("cannot render `{}`: {source}", path.display())]
    #[diagnostic(code(designgen::write::render))]
    Render { path: PathBuf, source: RenderError },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Normalize(#[from] NormalizeError),
}

/// A write session rooted at one directory.
#[derive(Debug)]
pub struct Writer {
    dir: PathBuf,
    files: BTreeSet<PathBuf>,
    namespace: Option<Namespace>,
}

impl Writer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: BTreeSet::new(),
            namespace: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Relative paths written so far in this session.
    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    /// Write `file` and return its full path.
    pub fn write(&mut self, file: &dyn File) -> Result<PathBuf, WriteError> {
        let rel = file.output_path(&self.files)?;
        self.write_at(rel, file)
    }

    /// Write `file` unless its target already exists on disk.
    ///
    /// Scaffolding is meant to be edited by hand, so an existing file always wins; `Ok(None)` means nothing was
    /// touched.
    pub fn write_scaffold(&mut self, file: &dyn File) -> Result<Option<PathBuf>, WriteError> {
        let rel = file.output_path(&self.files)?;
        if self.dir.join(&rel).exists() {
            tracing::debug!(path = %rel.display(), "scaffold file exists, skipping");
            return Ok(None);
        }
        self.write_at(rel, file).map(Some)
    }

    fn write_at(&mut self, rel: PathBuf, file: &dyn File) -> Result<PathBuf, WriteError> {
        check_relative(&rel)?;
        if self.files.contains(&rel) {
            return Err(PathConflict { path: rel }.into());
        }

        let path = self.dir.join(&rel);
        let io_error = |source| WriteError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let mut out = BufWriter::new(fs::File::create(&path).map_err(io_error)?);

        let namespace = self.namespace()?;
        for section in file.sections(namespace) {
            section.write(&mut out).map_err(|source| WriteError::Render {
                path: path.clone(),
                source,
            })?;
        }
        out.flush().map_err(io_error)?;
        drop(out);

        if rel.extension().is_some_and(|ext| ext == "rs") {
            normalize_file(&path)?;
        }

        tracing::debug!(
            path = %path.display(),
            crate_name = namespace.crate_name(),
            module = %namespace.path(),
            "wrote generated file"
        );
        self.files.insert(rel);
        Ok(path)
    }

    fn namespace(&mut self) -> Result<&Namespace, NamespaceError> {
        let namespace = match self.namespace.take() {
            Some(namespace) => namespace,
            None => Namespace::resolve(&self.dir)?,
        };
        Ok(self.namespace.insert(namespace))
    }
}

fn check_relative(rel: &Path) -> Result<(), WriteError> {
    let escapes = rel.as_os_str().is_empty() || rel.components().any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(WriteError::Escapes {
            path: rel.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;
    use crate::file::{CollisionPolicy, resolve_path};
    use crate::section::{Section, Template};

    static BODY: Template = Template::new("body", "// in {{ namespace }}\n{{ code }}\n");

    #[derive(Serialize)]
    struct Body<'a> {
        namespace: String,
        code: &'a str,
    }

    struct TestFile {
        path: &'static str,
        code: &'static str,
        policy: CollisionPolicy,
    }

    impl TestFile {
        fn new(path: &'static str, code: &'static str) -> Self {
            Self {
                path,
                code,
                policy: CollisionPolicy::Fail,
            }
        }
    }

    impl File for TestFile {
        fn sections(&self, namespace: &Namespace) -> Vec<Section> {
            vec![Section::new(
                &BODY,
                Body {
                    namespace: namespace.path(),
                    code: self.code,
                },
            )]
        }

        fn output_path(&self, reserved: &BTreeSet<PathBuf>) -> Result<PathBuf, PathConflict> {
            resolve_path(self.path, reserved, self.policy)
        }
    }

    /// A file that ignores the registry.
    struct Stubborn(&'static str);

    impl File for Stubborn {
        fn sections(&self, _: &Namespace) -> Vec<Section> {
            Vec::new()
        }

        fn output_path(&self, _: &BTreeSet<PathBuf>) -> Result<PathBuf, PathConflict> {
            Ok(PathBuf::from(self.0))
        }
    }

    fn session() -> (tempfile::TempDir, Writer) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Cargo.toml"), "[package]\nname = \"demo-api\"\nversion = \"0.1.0\"\n").unwrap();
        let writer = Writer::new(tmp.path().join("src/generated"));
        (tmp, writer)
    }

    #[test]
    fn test_write_renders_normalizes_and_registers() {
        let (_tmp, mut writer) = session();
        let path = writer
            .write(&TestFile::new("service/account.rs", "use std::fmt;\npub struct   Account;"))
            .unwrap();

        assert_eq!(path, writer.dir().join("service/account.rs"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "// in crate::generated\n\npub struct Account;\n");
        assert!(writer.files().contains(Path::new("service/account.rs")));
    }

    #[test]
    fn test_non_rust_files_are_written_verbatim() {
        let (_tmp, mut writer) = session();
        let path = writer.write(&TestFile::new("openapi.json", "{ }")).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "// in crate::generated\n{ }\n");
    }

    #[test]
    fn test_second_write_of_same_path_conflicts() {
        let (_tmp, mut writer) = session();
        writer.write(&TestFile::new("a.rs", "fn a() {}")).unwrap();

        let err = writer.write(&TestFile::new("a.rs", "fn b() {}")).unwrap_err();
        assert!(matches!(err, WriteError::Conflict(_)));

        let err = writer.write(&Stubborn("a.rs")).unwrap_err();
        assert!(matches!(err, WriteError::Conflict(_)));
        assert_eq!(writer.files().len(), 1);
    }

    #[test]
    fn test_suffix_policy_diverges() {
        let (_tmp, mut writer) = session();
        let mut file = TestFile::new("openapi.json", "{}");
        file.policy = CollisionPolicy::Suffix;

        writer.write(&file).unwrap();
        let second = writer.write(&file).unwrap();
        assert!(second.ends_with("openapi_2.json"));
    }

    #[test]
    fn test_escaping_paths_are_rejected() {
        let (_tmp, mut writer) = session();
        for bad in ["../outside.rs", "/abs.rs", "", "./a.rs"] {
            let err = writer.write(&Stubborn(bad)).unwrap_err();
            assert!(matches!(err, WriteError::Escapes { .. }), "{bad}: {err}");
        }
        assert!(writer.files().is_empty());
    }

    #[test]
    fn test_failed_normalization_leaves_registry_untouched() {
        let (_tmp, mut writer) = session();
        let err = writer.write(&TestFile::new("broken.rs", "fn (")).unwrap_err();

        assert!(matches!(err, WriteError::Normalize(NormalizeError::Parse { .. })));
        assert!(writer.files().is_empty());
        writer.write(&TestFile::new("broken.rs", "fn fixed() {}")).unwrap();
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = Writer::new(tmp.path());
        let err = writer.write(&TestFile::new("a.rs", "fn a() {}")).unwrap_err();
        assert!(matches!(err, WriteError::Namespace(NamespaceError::NotFound { .. })));
        assert!(writer.files().is_empty());
    }

    #[test]
    fn test_scaffold_never_overwrites() {
        let (_tmp, mut writer) = session();
        let target = writer.dir().join("handlers/account.rs");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "// edited by hand\n").unwrap();

        let written = writer.write_scaffold(&TestFile::new("handlers/account.rs", "fn x() {}")).unwrap();
        assert_eq!(written, None);
        assert_eq!(fs::read_to_string(&target).unwrap(), "// edited by hand\n");
        assert!(writer.files().is_empty());

        let fresh = writer.write_scaffold(&TestFile::new("handlers/user.rs", "fn y() {}")).unwrap();
        assert!(fresh.is_some());
    }
}
