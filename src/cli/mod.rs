//! CLI module for designgen
//!
//! This module provides the `designgen` command-line interface.
//!
//! ## Commands
//!
//! - `generate <DESIGN>` - Build and run a generator for a design crate
//! - `version` - Print the designgen version
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::driver::GeneratorKind;
use crate::pipeline::Toolchain;
use crate::version::DESIGNGEN_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Generate service code from a design crate
#[derive(Parser, Debug)]
#[command(name = "designgen")]
#[command(version = DESIGNGEN_VERSION)]
#[command(about = "Generate service code from a design crate", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and run a generator for a design crate
    Generate {
        /// Design crate directory (or its Cargo.toml)
        #[arg(value_name = "DESIGN")]
        design: PathBuf,
        /// Generators to run, in order (default: all)
        #[arg(short = 'g', long = "generator", value_enum, value_delimiter = ',')]
        generators: Vec<GeneratorKind>,
        /// Output directory, inside a cargo package
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
        /// Also generate service implementation stubs (existing files are left alone)
        #[arg(short, long)]
        scaffold: bool,
        /// Keep the generator workspace
        #[arg(long)]
        debug: bool,
        #[command(flatten)]
        toolchain: ToolchainArgs,
    },

    /// Print the designgen version
    Version,
}

/// How the generator program is built.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct ToolchainArgs {
    /// cargo executable
    #[arg(long, env = "DESIGNGEN_CARGO", value_name = "PATH")]
    pub cargo: Option<PathBuf>,
    /// Directory holding the designgen support crates
    #[arg(long, env = "DESIGNGEN_CRATES_DIR", value_name = "DIR")]
    pub crates_dir: Option<PathBuf>,
    /// Shared cargo target directory for generator builds
    #[arg(long, env = "DESIGNGEN_TARGET_DIR", value_name = "DIR")]
    pub target_dir: Option<PathBuf>,
    /// Build the generator without network access
    #[arg(long, env = "DESIGNGEN_OFFLINE")]
    pub offline: bool,
}

impl ToolchainArgs {
    /// The default toolchain with every given option applied.
    pub fn toolchain(self) -> Toolchain {
        let defaults = Toolchain::default();
        Toolchain {
            cargo: self.cargo.unwrap_or(defaults.cargo),
            crates_dir: self.crates_dir.unwrap_or(defaults.crates_dir),
            target_dir: self.target_dir,
            offline: self.offline,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate {
            design,
            generators,
            output,
            scaffold,
            debug,
            toolchain,
        } => commands::generate_command(commands::GenerateArgs {
            design,
            generators,
            output,
            scaffold,
            debug,
            toolchain: toolchain.toolchain(),
        }),
        Command::Version => commands::version_command(),
    }
}

// ============================================================================
// Tests
// ============================================================================
