//! Build-and-execute orchestration.
//!
//! [`generate`] runs one generation request as a linear sequence of [`Stage`]s:
//!
//! 1. resolve the design crate ([`description`]);
//! 2. stage a unique cargo workspace holding the driver manifest ([`workspace`]);
//! 3. write the driver's `src/main.rs` through a [`Writer`] session rooted at the workspace;
//! 4. `cargo build` the driver ([`toolchain`]);
//! 5. run it with `--output` and `--version`;
//! 6. return its stdout, the sorted list of written files.
//!
//! The first failure ends the run. The workspace is deleted after a successful run unless the request asks to keep
//! it; after a failure it is always kept and [`GenerateError::workspace`] says where.
//!
//! Nothing here links the design crate. It is only ever compiled into the driver.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod description;
pub mod toolchain;
pub mod workspace;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use designgen_codegen::{RenderError, WriteError, Writer};
use miette::Diagnostic;
use thiserror::Error;

use crate::driver::{DriverManifest, DriverSpec, GeneratorKind, MainFile};

pub use toolchain::Toolchain;
pub use workspace::Workspace;

/// Progress of a run. A failure leaves the run in the stage it had reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    DescriptionResolved,
    WorkspaceStaged,
    DriverWritten,
    Compiled,
    Executed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::DescriptionResolved => "description resolved",
            Stage::WorkspaceStaged => "workspace staged",
            Stage::DriverWritten => "driver written",
            Stage::Compiled => "compiled",
            Stage::Executed => "executed",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// One generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Generators to run, in order. Duplicates are dropped; empty means all of them.
    pub generators: Vec<GeneratorKind>,
    /// Directory or `Cargo.toml` of the design crate.
    pub design: PathBuf,
    /// Directory the driver writes into. It must be inside a cargo package.
    pub output: PathBuf,
    /// Also generate the (never overwritten) service implementation scaffold.
    pub scaffold: bool,
    /// Keep the workspace after a successful run.
    pub debug: bool,
    /// Directory the workspace is created in.
    pub work_dir: PathBuf,
    pub toolchain: Toolchain,
}

impl GenerateRequest {
    /// A request running every generator from the current directory with the default toolchain.
    pub fn new(design: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            generators: GeneratorKind::ALL.to_vec(),
            design: design.into(),
            output: output.into(),
            scaffold: false,
            debug: false,
            work_dir: PathBuf::from("."),
            toolchain: Toolchain::default(),
        }
    }
}

/// Why a run failed.
#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error("design crate not found at `{}`", path.display())]
    #[diagnostic(
        code(designgen::design::not_found),
        help("pass the directory (or Cargo.toml) of a cargo package exporting `pub fn design(ctx: &mut Context)`")
    )]
    DesignNotFound { path: PathBuf },

    #[error("design crate at `{}` cannot be imported: {reason}", path.display())]
    #[diagnostic(code(designgen::design::not_importable))]
    DesignNotImportable { path: PathBuf, reason: String },

    #[error("designgen support crates not found in `{}`", dir.display())]
    #[diagnostic(
        code(designgen::toolchain::crates_dir),
        help("point --crates-dir (or DESIGNGEN_CRATES_DIR) at the `crates` directory of the designgen sources")
    )]
    SupportCratesNotFound { dir: PathBuf },

    #[error("cannot render the generator manifest: {0}")]
    #[diagnostic(code(designgen::workspace::manifest))]
    Manifest(#[source] RenderError),

    #[error("cannot stage the generator workspace in `{}`: {source}", dir.display())]
    #[diagnostic(code(designgen::workspace::io))]
    Workspace { dir: PathBuf, source: io::Error },

    #[error("cannot write the generator program: {source}")]
    #[diagnostic(code(designgen::driver::write))]
    WriteDriver { source: WriteError, workspace: PathBuf },

    #[error("cannot find `{}` (searched {searched})", cargo.display())]
    #[diagnostic(
        code(designgen::toolchain::cargo),
        help("install a Rust toolchain or point --cargo (or DESIGNGEN_CARGO) at the cargo executable")
    )]
    CompilerNotFound {
        cargo: PathBuf,
        searched: String,
        workspace: PathBuf,
    },

    #[error("cannot run `{}`: {source}", program.display())]
    #[diagnostic(code(designgen::toolchain::spawn))]
    Spawn {
        program: PathBuf,
        stage: Stage,
        source: io::Error,
        workspace: PathBuf,
    },

    #[error("failed to compile generator: {output}")]
    #[diagnostic(code(designgen::toolchain::compile))]
    Compile { output: String, workspace: PathBuf },

    #[error("cannot resolve the output directory `{}`: {source}", path.display())]
    #[diagnostic(code(designgen::output))]
    Output {
        path: PathBuf,
        source: io::Error,
        workspace: PathBuf,
    },

    #[error("generator failed: {}", driver_message(.status, .output))]
    #[diagnostic(code(designgen::driver::failed))]
    Driver {
        status: ExitStatus,
        output: String,
        workspace: PathBuf,
    },
}

fn driver_message(status: &ExitStatus, output: &str) -> String {
    let output = output.trim_end();
    if output.is_empty() {
        status.to_string()
    } else {
        format!("{status}\n{output}")
    }
}

impl GenerateError {
    /// The stage the run had reached when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            GenerateError::DesignNotFound { .. } | GenerateError::DesignNotImportable { .. } => Stage::Start,
            GenerateError::SupportCratesNotFound { .. }
            | GenerateError::Manifest(_)
            | GenerateError::Workspace { .. } => Stage::DescriptionResolved,
            GenerateError::WriteDriver { .. } => Stage::WorkspaceStaged,
            GenerateError::CompilerNotFound { .. } | GenerateError::Compile { .. } => Stage::DriverWritten,
            GenerateError::Spawn { stage, .. } => *stage,
            GenerateError::Output { .. } | GenerateError::Driver { .. } => Stage::Compiled,
        }
    }

    /// The staging workspace the failed run left behind, if it got that far.
    pub fn workspace(&self) -> Option<&Path> {
        match self {
            GenerateError::WriteDriver { workspace, .. }
            | GenerateError::CompilerNotFound { workspace, .. }
            | GenerateError::Spawn { workspace, .. }
            | GenerateError::Compile { workspace, .. }
            | GenerateError::Output { workspace, .. }
            | GenerateError::Driver { workspace, .. } => Some(workspace),
            _ => None,
        }
    }
}

/// Run one generation request and return the driver's stdout.
pub fn generate(request: &GenerateRequest) -> Result<String, GenerateError> {
    tracing::debug!(design = %request.design.display(), "resolving design crate");
    let design = description::resolve(&request.design)?;
    tracing::info!(stage = %Stage::DescriptionResolved, package = %design.package, "design crate found");

    let spec = DriverSpec::new(&request.generators, design, request.scaffold);
    let crates_dir = request.toolchain.support_crates()?;
    let manifest = DriverManifest::new(&spec, &crates_dir)
        .render()
        .map_err(GenerateError::Manifest)?;
    let workspace = Workspace::create(&request.work_dir, &manifest)?;
    tracing::debug!(stage = %Stage::WorkspaceStaged, workspace = %workspace.path().display(), "staged generator workspace");

    match build_and_run(request, &spec, workspace.path()) {
        Ok(stdout) => {
            if request.debug {
                tracing::info!(workspace = %workspace.path().display(), "keeping generator workspace");
            } else if let Err(err) = workspace.remove() {
                tracing::warn!(error = %err, "cannot remove generator workspace");
            }
            tracing::debug!(stage = %Stage::Done, "generation finished");
            Ok(stdout)
        }
        Err(err) => {
            tracing::warn!(
                stage = %err.stage(),
                workspace = %workspace.path().display(),
                "generation failed, keeping generator workspace"
            );
            Err(err)
        }
    }
}

fn build_and_run(request: &GenerateRequest, spec: &DriverSpec, workspace: &Path) -> Result<String, GenerateError> {
    let mut writer = Writer::new(workspace);
    writer
        .write(&MainFile::new(spec))
        .map_err(|source| GenerateError::WriteDriver {
            source,
            workspace: workspace.to_path_buf(),
        })?;
    tracing::debug!(stage = %Stage::DriverWritten, "wrote generator program");

    let toolchain = &request.toolchain;
    let cargo = toolchain.locate_cargo(workspace)?;
    toolchain.compile(&cargo, workspace)?;
    tracing::info!(stage = %Stage::Compiled, generators = ?spec.generators(), "compiled generator");

    let output = std::path::absolute(&request.output).map_err(|source| GenerateError::Output {
        path: request.output.clone(),
        source,
        workspace: workspace.to_path_buf(),
    })?;
    let stdout = toolchain.execute(workspace, &output)?;
    tracing::debug!(stage = %Stage::Executed, output = %output.display(), "generator finished");
    Ok(stdout)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_are_ordered() {
        assert!(Stage::Start < Stage::DescriptionResolved);
        assert!(Stage::Compiled < Stage::Executed);
        assert_eq!(Stage::WorkspaceStaged.to_string(), "workspace staged");
    }

    #[test]
    fn test_error_prefixes() {
        let compile = GenerateError::Compile {
            output: "error[E0425]: cannot find value `x`".to_string(),
            workspace: PathBuf::from("/tmp/designgen1"),
        };
        assert_eq!(compile.to_string(), "failed to compile generator: error[E0425]: cannot find value `x`");
        assert_eq!(compile.stage(), Stage::DriverWritten);
        assert_eq!(compile.workspace(), Some(Path::new("/tmp/designgen1")));

        let missing = GenerateError::DesignNotFound {
            path: PathBuf::from("nope"),
        };
        assert_eq!(missing.stage(), Stage::Start);
        assert_eq!(missing.workspace(), None);
    }

    #[test]
    fn test_default_request() {
        let request = GenerateRequest::new("design", "out");
        assert_eq!(request.generators, GeneratorKind::ALL);
        assert!(!request.scaffold && !request.debug);
        assert_eq!(request.toolchain, Toolchain::default());
    }

    #[test]
    fn test_unknown_design_fails_before_staging() {
        let tmp = tempfile::tempdir().unwrap();
        let mut request = GenerateRequest::new(tmp.path().join("missing"), tmp.path().join("out"));
        request.work_dir = tmp.path().join("work");

        let err = generate(&request).unwrap_err();
        assert!(matches!(err, GenerateError::DesignNotFound { .. }));
        assert!(!request.work_dir.exists());
    }
}
