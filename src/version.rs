//! designgen version information.
//!
//! The CLI passes this value to every driver it runs (`--version=`), and the driver compares it with the
//! `designgen_codegen` it was compiled against. Both come from the shared workspace version.

/// The designgen version string (for example, `0.1.0`).
pub const DESIGNGEN_VERSION: &str = designgen_codegen::VERSION;
