//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::PathBuf;

use miette::Diagnostic;

use crate::driver::GeneratorKind;
use crate::pipeline::{self, GenerateError, GenerateRequest, Toolchain};
use crate::version::DESIGNGEN_VERSION;

use super::{CliError, CliResult, ExitCode};

/// Arguments of `designgen generate`, after clap.
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub design: PathBuf,
    pub generators: Vec<GeneratorKind>,
    pub output: PathBuf,
    pub scaffold: bool,
    pub debug: bool,
    pub toolchain: Toolchain,
}

impl GenerateArgs {
    fn request(self) -> GenerateRequest {
        GenerateRequest {
            generators: self.generators,
            design: self.design,
            output: self.output,
            scaffold: self.scaffold,
            debug: self.debug,
            work_dir: PathBuf::from("."),
            toolchain: self.toolchain,
        }
    }
}

/// `designgen generate`: print the generated paths, one per line.
pub fn generate_command(args: GenerateArgs) -> CliResult<ExitCode> {
    let request = args.request();
    let stdout = pipeline::generate(&request).map_err(report)?;
    let stdout = stdout.trim_end();
    if !stdout.is_empty() {
        println!("{stdout}");
    }
    Ok(ExitCode::SUCCESS)
}

/// `designgen version`
pub fn version_command() -> CliResult<ExitCode> {
    println!("{}", version_line());
    Ok(ExitCode::SUCCESS)
}

fn version_line() -> String {
    format!("designgen version {DESIGNGEN_VERSION}")
}

/// Render a pipeline failure: the message as is (compiler and generator output stay byte for byte), then its
/// diagnostic code and help, then where the workspace was kept.
fn report(err: GenerateError) -> CliError {
    let mut message = err.to_string();
    if let Some(code) = err.code() {
        message.push_str(&format!("\n  code: {code}"));
    }
    if let Some(help) = err.help() {
        message.push_str(&format!("\n  help: {help}"));
    }
    if let Some(dir) = err.workspace() {
        message.push_str(&format!("\ngenerator workspace kept at {}", dir.display()));
    }
    CliError::failure(message)
}
