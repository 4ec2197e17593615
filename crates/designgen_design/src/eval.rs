//! The evaluation context a design crate populates.
//!
//! A design crate exposes `pub fn design(ctx: &mut Context)`. The driver calls it, then [`Context::evaluate`] to
//! validate everything that was recorded, then [`Context::roots`] to hand the result to the generators.

use std::fmt;

use thiserror::Error;

use crate::builder::ApiBuilder;
use crate::model::Api;
use crate::validate::validate;

/// One problem found in a design.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct EvalError {
    /// Where the problem is, for example `API "account" service "account" endpoint "show"`.
    pub location: String,
    pub message: String,
}

impl EvalError {
    pub fn new(location: &str, message: impl Into<String>) -> Self {
        Self {
            location: location.to_string(),
            message: message.into(),
        }
    }
}

/// Every problem found by one evaluation, one per line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct EvalErrors(pub Vec<EvalError>);

impl fmt::Display for EvalErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RootsError {
    #[error("design has not been evaluated")]
    NotEvaluated,
    #[error("design defines no API")]
    Empty,
}

/// Top-level result of evaluating a design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    Api(Api),
}

impl Root {
    pub fn name(&self) -> &str {
        match self {
            Root::Api(api) => &api.name,
        }
    }
}

#[derive(Debug, Default)]
pub struct Context {
    apis: Vec<Api>,
    roots: Option<Vec<Root>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an API definition.
    pub fn api(&mut self, name: impl Into<String>, define: impl FnOnce(&mut ApiBuilder)) -> &mut Self {
        let mut api = Api::new(name);
        define(&mut ApiBuilder::new(&mut api));
        self.apis.push(api);
        self
    }

    /// Validate everything recorded so far and publish it as roots.
    ///
    /// Evaluating an already evaluated context is a no-op.
    pub fn evaluate(&mut self) -> Result<(), EvalErrors> {
        if self.roots.is_some() {
            return Ok(());
        }
        let errors = validate(&self.apis);
        if !errors.is_empty() {
            return Err(EvalErrors(errors));
        }
        tracing::debug!(apis = self.apis.len(), "design evaluated");
        self.roots = Some(std::mem::take(&mut self.apis).into_iter().map(Root::Api).collect());
        Ok(())
    }

    pub fn roots(&self) -> Result<&[Root], RootsError> {
        match &self.roots {
            None => Err(RootsError::NotEvaluated),
            Some(roots) if roots.is_empty() => Err(RootsError::Empty),
            Some(roots) => Ok(roots),
        }
    }
}
