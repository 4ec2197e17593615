//! Concrete generators run by designgen drivers.
//!
//! Every generator has the same shape: `generate(&[Root]) -> Result<Vec<Box<dyn File>>, GeneratorError>`. Generators
//! only describe files; the driver writes them through a [`Writer`](designgen_codegen::Writer) once every selected
//! generator has succeeded.
//!
//! | Generator | Output (relative to the output directory) |
//! |---|---|
//! | [`server`] | `service/<svc>.rs` (types and service trait), `transport/<svc>_http.rs` (axum router), module indexes |
//! | [`client`] | `client/<svc>.rs` (types and blocking reqwest client), module index |
//! | [`openapi`] | `openapi.json` (OpenAPI 3.0.3) |
//! | [`scaffold`] | `handlers/<svc>.rs` (service implementation stub), module index; never overwritten |

use thiserror::Error;

pub mod client;
pub mod openapi;
pub mod scaffold;
pub mod server;

mod rust;

/// A generator could not produce its files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{generator} generator: {message}")]
pub struct GeneratorError {
    /// Name of the failing generator (`server`, `client`, `openapi`, `scaffold`).
    pub generator: &'static str,
    pub message: String,
}

impl GeneratorError {
    pub fn new(generator: &'static str, message: impl Into<String>) -> Self {
        Self {
            generator,
            message: message.into(),
        }
    }
}
