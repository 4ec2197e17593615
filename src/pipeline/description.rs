//! Resolve the design crate a run generates from.
//!
//! The design is referenced by its package directory or its `Cargo.toml`. Only the manifest is read here; the crate
//! itself is compiled later, inside the driver.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::GenerateError;
use crate::driver::DesignCrate;

#[derive(Deserialize)]
struct Manifest {
    package: Option<Package>,
    lib: Option<toml::Table>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
}

/// Find the design package and check that the driver can link it.
pub fn resolve(design: &Path) -> Result<DesignCrate, GenerateError> {
    let not_found = || GenerateError::DesignNotFound {
        path: design.to_path_buf(),
    };
    let dir = if design.file_name().is_some_and(|name| name == "Cargo.toml") {
        design.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        design.to_path_buf()
    };
    let dir = if dir.as_os_str().is_empty() { PathBuf::from(".") } else { dir };
    let dir = fs::canonicalize(&dir).map_err(|_| not_found())?;
    let manifest_path = dir.join("Cargo.toml");
    if !manifest_path.is_file() {
        return Err(not_found());
    }

    let not_importable = |reason: String| GenerateError::DesignNotImportable {
        path: dir.clone(),
        reason,
    };
    let text = fs::read_to_string(&manifest_path)
        .map_err(|err| not_importable(format!("cannot read {}: {err}", manifest_path.display())))?;
    let manifest: Manifest = toml::from_str(&text).map_err(|err| not_importable(format!("invalid Cargo.toml: {err}")))?;
    let Some(package) = manifest.package else {
        return Err(not_importable("Cargo.toml has no [package] table".to_string()));
    };
    if manifest.lib.is_none() && !dir.join("src/lib.rs").is_file() {
        return Err(not_importable("package has no library target".to_string()));
    }

    tracing::debug!(package = %package.name, dir = %dir.display(), "resolved design crate");
    Ok(DesignCrate {
        package: package.name,
        dir,
    })
}
