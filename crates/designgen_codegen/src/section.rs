//! Templated file sections.
//!
//! A [`Section`] pairs a compiled [`Template`] with the data it is rendered against. Templates are declared as
//! statics, compiled on first use, and reused for every section that references them; the data is captured once when
//! the section is built, so rendering a section is a pure function of the section.
//!
//! ## Notes
//!
//! - Undefined template variables are errors (strict mode): a template/data mismatch never renders as an empty string.
//! - Auto-escaping is disabled; sections produce source code and documents, never HTML.

use std::fmt;
use std::io;
use std::sync::OnceLock;

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use serde::Serialize;
use thiserror::Error;

use crate::import::ImportSpec;

/// Error produced while compiling or rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template source does not compile.
    #[error("template `{name}` does not compile: {source:#}")]
    Compile {
        name: &'static str,
        source: minijinja::Error,
    },

    /// Rendering failed (missing data, type mismatch, or a failing sink).
    #[error("template `{name}` failed to render: {source:#}")]
    Render {
        name: &'static str,
        source: minijinja::Error,
    },
}

/// A named template source, compiled once and cached.
///
/// Declare templates as statics so every section can borrow them:
///
/// ```rust
/// use designgen_codegen::{Section, Template};
///
/// static GREETING: Template = Template::new("greeting", "Hello {{ name }}!");
///
/// #[derive(serde::Serialize)]
/// struct Data {
///     name: &'static str,
/// }
///
/// let section = Section::new(&GREETING, Data { name: "world" });
/// assert_eq!(section.render().unwrap(), "Hello world!");
/// ```
pub struct Template {
    name: &'static str,
    source: &'static str,
    compiled: OnceLock<Environment<'static>>,
}

impl Template {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self {
            name,
            source,
            compiled: OnceLock::new(),
        }
    }

    /// Render the template against `data` into `sink`.
    pub fn render_to(&self, data: &Value, sink: &mut dyn io::Write) -> Result<(), RenderError> {
        let env = self.environment()?;
        let template = env.get_template(self.name).map_err(|source| RenderError::Render {
            name: self.name,
            source,
        })?;
        template
            .render_captured_to(data, sink)
            .map(|_| ())
            .map_err(|source| RenderError::Render {
                name: self.name,
                source,
            })
    }

    /// Compile on first use. Failures are not cached, so every render reports the compile error again.
    fn environment(&self) -> Result<&Environment<'static>, RenderError> {
        if let Some(env) = self.compiled.get() {
            return Ok(env);
        }

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template(self.name, self.source)
            .map_err(|source| RenderError::Compile {
                name: self.name,
                source,
            })?;

        Ok(self.compiled.get_or_init(|| env))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template").field("name", &self.name).finish_non_exhaustive()
    }
}

/// One templated chunk of a generated file.
#[derive(Debug, Clone)]
pub struct Section {
    template: &'static Template,
    data: Value,
}

impl Section {
    pub fn new(template: &'static Template, data: impl Serialize) -> Self {
        Self {
            template,
            data: Value::from_serialize(&data),
        }
    }

    /// Write the rendered section to `sink`.
    pub fn write(&self, sink: &mut dyn io::Write) -> Result<(), RenderError> {
        self.template.render_to(&self.data, sink)
    }

    /// Render the section to a string.
    pub fn render(&self) -> Result<String, RenderError> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

static HEADER: Template = Template::new("header", include_str!("templates/header.jinja"));

#[derive(Serialize)]
struct HeaderData<'a> {
    version: &'static str,
    title: &'a str,
    imports: Vec<String>,
}

/// The standard generated-file banner followed by the file's `use` declarations.
///
/// Templates may over-declare imports; the normalization pass removes the ones the file body never references.
pub fn header(title: &str, imports: &[ImportSpec]) -> Section {
    Section::new(
        &HEADER,
        HeaderData {
            version: crate::VERSION,
            title,
            imports: imports.iter().map(ImportSpec::code).collect(),
        },
    )
}
