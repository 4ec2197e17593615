//! Describe services for designgen.
//!
//! A design crate depends on this crate and exports one entry point:
//!
//! ```rust,ignore
//! pub fn design(ctx: &mut designgen_design::Context) { /* ctx.api(...) */ }
//! ```
//!
//! The generated driver calls it, evaluates the context, and passes the resulting [`Root`]s to the generators. The
//! model is intentionally small: an API has user types and services, a service has HTTP endpoints.

pub mod builder;
pub mod eval;
pub mod model;
pub mod validate;

pub use builder::{ApiBuilder, EndpointBuilder, ServiceBuilder, TypeBuilder};
pub use eval::{Context, EvalError, EvalErrors, Root, RootsError};
pub use model::{Api, Endpoint, Field, FieldType, HttpMethod, Service, UserType};
