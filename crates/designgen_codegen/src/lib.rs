#![forbid(unsafe_code)]
//! Code generation primitives shared by the `designgen` CLI and the drivers it synthesizes.
//!
//! A generated file is described by a [`File`]: an ordered list of [`Section`]s (a template paired with its data) and
//! a function that picks a relative output path given the paths already written. A [`Writer`] session renders files
//! into a directory, keeps the registry of written paths, and runs every emitted `.rs` file through the
//! [normalization pass](normalize) (unused `use` removal plus canonical `prettyplease` formatting).
//!
//! ## Notes
//!
//! - The crate is linked twice per run: once by the CLI (to write the driver program) and once by the driver itself
//!   (to write the generated files). Each process owns its own [`Writer`]; nothing here is process-global.
//! - [`VERSION`] is the value the driver compares against the `--version` flag it receives.

pub mod file;
pub mod import;
pub mod naming;
pub mod namespace;
pub mod normalize;
pub mod section;
pub mod writer;

pub use file::{CollisionPolicy, File, PathConflict, resolve_path};
pub use import::ImportSpec;
pub use namespace::{Namespace, NamespaceError};
pub use normalize::{NormalizeError, normalize_file, normalize_source};
pub use section::{RenderError, Section, Template, header};
pub use writer::{WriteError, Writer};

/// The designgen toolchain version (for example, `0.1.0`).
///
/// All workspace crates share one version, so the CLI and a driver compiled against these sources agree on it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
