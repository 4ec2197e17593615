//! Identity of the module generated files are written into.
//!
//! Generated files reference each other through `crate::...` paths, so a writer has to know which crate its output
//! directory belongs to and where below `src/` it sits. That is discovered from the filesystem: the nearest enclosing
//! `Cargo.toml` with a `[package]` table names the crate, and the directories between `<crate>/src` and the output
//! directory form the module path.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors while resolving the namespace of an output directory.
#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error(
        "cannot determine the crate that `{}` belongs to: no Cargo.toml with a [package] table in it or its parents",
        dir.display()
    )]
    NotFound { dir: PathBuf },

    #[error("cannot read `{}`: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid manifest `{}`: {source}", path.display())]
    Manifest { path: PathBuf, source: toml::de::Error },
}

/// The crate and module a directory of generated files belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    crate_name: String,
    module_path: Vec<String>,
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<Package>,
    lib: Option<LibTarget>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
}

#[derive(Deserialize)]
struct LibTarget {
    name: Option<String>,
}

impl Namespace {
    pub fn new(crate_name: impl Into<String>, module_path: Vec<String>) -> Self {
        Self {
            crate_name: crate_name.into(),
            module_path,
        }
    }

    /// Crate name as a Rust identifier (`my-service` becomes `my_service`).
    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    /// Module segments below the crate root (empty for the crate root itself).
    pub fn module_path(&self) -> &[String] {
        &self.module_path
    }

    /// The `crate::...` path of this namespace.
    pub fn path(&self) -> String {
        std::iter::once("crate")
            .chain(self.module_path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Qualify a module path relative to this namespace (`service::account` -> `crate::api::service::account`).
    pub fn qualify(&self, relative: &str) -> String {
        format!("{}::{}", self.path(), relative)
    }

    /// Resolve the namespace of an existing directory.
    pub fn resolve(dir: &Path) -> Result<Self, NamespaceError> {
        let dir = fs::canonicalize(dir).map_err(|source| NamespaceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for candidate in dir.ancestors() {
            let manifest_path = candidate.join("Cargo.toml");
            if !manifest_path.is_file() {
                continue;
            }
            let text = fs::read_to_string(&manifest_path).map_err(|source| NamespaceError::Io {
                path: manifest_path.clone(),
                source,
            })?;
            let manifest: Manifest = toml::from_str(&text).map_err(|source| NamespaceError::Manifest {
                path: manifest_path.clone(),
                source,
            })?;
            // Virtual workspace manifests name no crate; keep looking upwards.
            let Some(package) = manifest.package else {
                continue;
            };

            let crate_name = manifest
                .lib
                .and_then(|lib| lib.name)
                .unwrap_or(package.name)
                .replace('-', "_");
            let module_path = dir
                .strip_prefix(candidate.join("src"))
                .map(|rel| {
                    rel.components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect()
                })
                .unwrap_or_default();

            tracing::debug!(crate_name = %crate_name, dir = %dir.display(), "resolved output namespace");
            return Ok(Self::new(crate_name, module_path));
        }

        Err(NamespaceError::NotFound { dir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, body: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("Cargo.toml"), body).unwrap();
    }

    #[test]
    fn test_resolve_module_below_src() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "[package]\nname = \"account-service\"\nversion = \"0.1.0\"\n");
        let out = tmp.path().join("src/api/generated");
        fs::create_dir_all(&out).unwrap();

        let ns = Namespace::resolve(&out).unwrap();
        assert_eq!(ns.crate_name(), "account_service");
        assert_eq!(ns.module_path(), ["api".to_string(), "generated".to_string()]);
        assert_eq!(ns.path(), "crate::api::generated");
        assert_eq!(ns.qualify("service::account"), "crate::api::generated::service::account");
    }

    #[test]
    fn test_resolve_crate_root_and_lib_name() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(
            tmp.path(),
            "[package]\nname = \"driver\"\nversion = \"0.1.0\"\n\n[lib]\nname = \"driver_lib\"\n",
        );

        let ns = Namespace::resolve(tmp.path()).unwrap();
        assert_eq!(ns.crate_name(), "driver_lib");
        assert!(ns.module_path().is_empty());
        assert_eq!(ns.path(), "crate");
    }

    #[test]
    fn test_virtual_manifest_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "[package]\nname = \"outer\"\nversion = \"0.1.0\"\n");
        let inner = tmp.path().join("nested");
        write_manifest(&inner, "[workspace]\nmembers = []\n");

        let ns = Namespace::resolve(&inner).unwrap();
        assert_eq!(ns.crate_name(), "outer");
    }

    #[test]
    fn test_invalid_manifest_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "[package\nname = ");

        let err = Namespace::resolve(tmp.path()).unwrap_err();
        assert!(matches!(err, NamespaceError::Manifest { .. }));
    }
}
