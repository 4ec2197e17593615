//! The host toolchain: locating `cargo`, compiling the driver, running it.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{GenerateError, Stage};
use crate::driver::{DRIVER_NAME, SUPPORT_CRATES};
use crate::version::DESIGNGEN_VERSION;

/// How drivers are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// `cargo` executable: a bare name is looked up in `PATH`, anything else is used as given.
    pub cargo: PathBuf,
    /// Directory holding the designgen support crates the driver depends on.
    pub crates_dir: PathBuf,
    /// Shared cargo target directory; each workspace gets its own `target/` when unset.
    pub target_dir: Option<PathBuf>,
    /// Pass `--offline` to cargo.
    pub offline: bool,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cargo: PathBuf::from("cargo"),
            crates_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("crates"),
            target_dir: None,
            offline: false,
        }
    }
}

impl Toolchain {
    /// The support crates directory, absolute, after checking every support crate is there.
    pub fn support_crates(&self) -> Result<PathBuf, GenerateError> {
        let not_found = || GenerateError::SupportCratesNotFound {
            dir: self.crates_dir.clone(),
        };
        let dir = self.crates_dir.canonicalize().map_err(|_| not_found())?;
        if SUPPORT_CRATES
            .iter()
            .all(|name| dir.join(name).join("Cargo.toml").is_file())
        {
            Ok(dir)
        } else {
            Err(not_found())
        }
    }

    /// Find the `cargo` executable.
    pub fn locate_cargo(&self, workspace: &Path) -> Result<PathBuf, GenerateError> {
        if self.cargo.components().count() > 1 {
            return if self.cargo.is_file() {
                Ok(self.cargo.clone())
            } else {
                Err(GenerateError::CompilerNotFound {
                    cargo: self.cargo.clone(),
                    searched: self.cargo.display().to_string(),
                    workspace: workspace.to_path_buf(),
                })
            };
        }

        let path = env::var_os("PATH").unwrap_or_default();
        let mut name = OsString::from(self.cargo.as_os_str());
        if self.cargo.extension().is_none() {
            name.push(env::consts::EXE_SUFFIX);
        }
        env::split_paths(&path)
            .map(|dir| dir.join(&name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| GenerateError::CompilerNotFound {
                cargo: self.cargo.clone(),
                searched: path.to_string_lossy().into_owned(),
                workspace: workspace.to_path_buf(),
            })
    }

    /// Target directory the driver is built into.
    pub fn target_dir(&self, workspace: &Path) -> PathBuf {
        match &self.target_dir {
            Some(dir) => std::path::absolute(dir).unwrap_or_else(|_| dir.clone()),
            None => workspace.join("target"),
        }
    }

    /// Path of the compiled driver binary.
    pub fn driver_binary(&self, workspace: &Path) -> PathBuf {
        self.target_dir(workspace)
            .join("debug")
            .join(format!("{DRIVER_NAME}{}", env::consts::EXE_SUFFIX))
    }

    /// `cargo build` the driver staged in `workspace`.
    pub fn compile(&self, cargo: &Path, workspace: &Path) -> Result<(), GenerateError> {
        let mut command = Command::new(cargo);
        command
            .args(["build", "--quiet", "--bin", DRIVER_NAME])
            .current_dir(workspace);
        if self.offline {
            command.arg("--offline");
        }
        if self.target_dir.is_some() {
            command.arg("--target-dir").arg(self.target_dir(workspace));
        }

        tracing::debug!(cargo = %cargo.display(), workspace = %workspace.display(), "compiling generator");
        let output = run(&mut command, cargo, Stage::DriverWritten, workspace)?;
        if output.status.success() {
            return Ok(());
        }
        Err(GenerateError::Compile {
            output: combined(&output),
            workspace: workspace.to_path_buf(),
        })
    }

    /// Run the compiled driver and return what it printed on stdout. A failing driver reports everything it printed.
    pub fn execute(&self, workspace: &Path, output_dir: &Path) -> Result<String, GenerateError> {
        let binary = self.driver_binary(workspace);
        let mut command = Command::new(&binary);
        command
            .arg(format!("--output={}", output_dir.display()))
            .arg(format!("--version={DESIGNGEN_VERSION}"));

        tracing::debug!(driver = %binary.display(), output = %output_dir.display(), "running generator");
        let output = run(&mut command, &binary, Stage::Compiled, workspace)?;
        if !output.status.success() {
            return Err(GenerateError::Driver {
                status: output.status,
                output: combined(&output),
                workspace: workspace.to_path_buf(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// stdout followed by stderr.
fn combined(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

fn run(command: &mut Command, program: &Path, stage: Stage, workspace: &Path) -> Result<Output, GenerateError> {
    command.output().map_err(|source| GenerateError::Spawn {
        program: program.to_path_buf(),
        stage,
        source,
        workspace: workspace.to_path_buf(),
    })
}
