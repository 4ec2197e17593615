#![forbid(unsafe_code)]
//! designgen: generate service code from a design crate.
//!
//! designgen never links the design it generates from. It synthesizes a small driver program that depends on the
//! design crate and on the generator crates, builds it with `cargo`, runs it, and relays the paths the driver wrote.
//!
//! - [`driver`] builds the driver: its `src/main.rs` as a [`designgen_codegen::File`] and its `Cargo.toml`.
//! - [`pipeline`] stages the workspace, compiles and executes the driver.
//! - [`cli`] is the `designgen` command line.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `pipeline` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Generated code**: The driver template calls `process::exit` on failure; that is output text, not a call made
//!   by designgen itself.

pub mod cli;
pub mod driver;
pub mod pipeline;
pub mod version;

pub use driver::{DriverManifest, DriverSpec, GeneratorKind, MainFile};
pub use pipeline::{GenerateError, GenerateRequest, Stage, Toolchain, generate};
pub use version::DESIGNGEN_VERSION;
