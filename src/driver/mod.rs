//! Generator synthesis: the transient driver program.
//!
//! A driver is a one-off binary crate that links the design crate together with the designgen support crates. It
//! evaluates the design, runs the selected generators, writes their files through a fresh
//! [`Writer`](designgen_codegen::Writer), and prints the written paths. This module only describes it:
//!
//! - [`MainFile`] is the driver's `src/main.rs`, written like any other generated [`File`];
//! - [`DriverManifest`] is its `Cargo.toml`, rendered as text before the first write so the writer can resolve the
//!   driver crate's namespace.
//!
//! ## Driver contract
//!
//! `designgen-driver --output=<dir> --version=<designgen version>`. A missing flag, a version mismatch, an invalid
//! design or a failing generator prints one message on stderr and exits with status 1 before anything is written.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use designgen_codegen::{
    CollisionPolicy, File, ImportSpec, Namespace, PathConflict, RenderError, Section, Template, header, resolve_path,
};
use serde::Serialize;

use crate::version::DESIGNGEN_VERSION;

static MAIN: Template = Template::new("main.rs", include_str!("templates/main.rs.jinja"));
static MANIFEST: Template = Template::new("Cargo.toml", include_str!("templates/Cargo.toml.jinja"));

/// Name of the driver package and binary.
pub const DRIVER_NAME: &str = "designgen-driver";

/// Dependency key the design crate is linked under inside the driver.
const DESIGN_DEPENDENCY: &str = "user_design";

/// The support crates every driver depends on, as directory names below the crates directory.
pub const SUPPORT_CRATES: [&str; 3] = ["designgen_codegen", "designgen_design", "designgen_generators"];

/// A generator selectable on the command line.
///
/// Each kind maps to one `designgen_generators` module exposing `generate(&[Root])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum GeneratorKind {
    /// Service traits, types and an axum router
    Server,
    /// Blocking HTTP client
    Client,
    /// OpenAPI 3 document
    #[value(name = "openapi")]
    OpenApi,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 3] = [GeneratorKind::Server, GeneratorKind::Client, GeneratorKind::OpenApi];

    /// The `designgen_generators` module implementing this generator.
    pub fn module(self) -> &'static str {
        match self {
            GeneratorKind::Server => "server",
            GeneratorKind::Client => "client",
            GeneratorKind::OpenApi => "openapi",
        }
    }
}

/// A design crate the driver links against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignCrate {
    /// Cargo package name, as written in the design's `Cargo.toml`.
    pub package: String,
    /// Absolute path of the package directory.
    pub dir: PathBuf,
}

/// Everything a driver is synthesized from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSpec {
    generators: Vec<GeneratorKind>,
    design: DesignCrate,
    scaffold: bool,
}

impl DriverSpec {
    /// Selection order is kept and duplicates are dropped. An empty selection means every generator.
    pub fn new(generators: &[GeneratorKind], design: DesignCrate, scaffold: bool) -> Self {
        let selected = if generators.is_empty() {
            &GeneratorKind::ALL[..]
        } else {
            generators
        };
        let mut seen = BTreeSet::new();
        let generators = selected.iter().copied().filter(|kind| seen.insert(*kind)).collect();
        Self {
            generators,
            design,
            scaffold,
        }
    }

    pub fn generators(&self) -> &[GeneratorKind] {
        &self.generators
    }
}

#[derive(Serialize)]
struct MainData<'a> {
    design_crate: &'a str,
    generators: Vec<&'static str>,
    scaffold: bool,
}

/// The driver's `src/main.rs`.
#[derive(Debug)]
pub struct MainFile<'a> {
    spec: &'a DriverSpec,
}

impl<'a> MainFile<'a> {
    pub fn new(spec: &'a DriverSpec) -> Self {
        Self { spec }
    }

    /// Every import any driver may need; normalization drops what this one does not use.
    fn imports() -> Vec<ImportSpec> {
        vec![
            ImportSpec::new("std::fs"),
            ImportSpec::new("std::path::PathBuf"),
            ImportSpec::new("std::process"),
            ImportSpec::new("clap::Parser"),
            ImportSpec::new("designgen_codegen::{File, Writer, VERSION}"),
            ImportSpec::new("designgen_design::{Context, Root}"),
            ImportSpec::new("designgen_generators::{client, openapi, scaffold, server}"),
        ]
    }
}

impl File for MainFile<'_> {
    fn sections(&self, _: &Namespace) -> Vec<Section> {
        vec![
            header("designgen driver", &Self::imports()),
            Section::new(
                &MAIN,
                MainData {
                    design_crate: DESIGN_DEPENDENCY,
                    generators: self.spec.generators.iter().map(|kind| kind.module()).collect(),
                    scaffold: self.spec.scaffold,
                },
            ),
        ]
    }

    fn output_path(&self, reserved: &BTreeSet<PathBuf>) -> Result<PathBuf, PathConflict> {
        resolve_path("src/main.rs", reserved, CollisionPolicy::Fail)
    }
}

#[derive(Serialize)]
struct ManifestData {
    version: &'static str,
    codegen: String,
    design: String,
    generators: String,
    design_crate: &'static str,
    design_package: String,
    design_path: String,
}

/// The driver's `Cargo.toml`.
#[derive(Debug)]
pub struct DriverManifest<'a> {
    spec: &'a DriverSpec,
    crates_dir: &'a Path,
}

impl<'a> DriverManifest<'a> {
    /// `crates_dir` holds the support crates ([`SUPPORT_CRATES`]).
    pub fn new(spec: &'a DriverSpec, crates_dir: &'a Path) -> Self {
        Self { spec, crates_dir }
    }

    pub fn render(&self) -> Result<String, RenderError> {
        let support = |name: &str| quoted(&self.crates_dir.join(name).to_string_lossy());
        Section::new(
            &MANIFEST,
            ManifestData {
                version: DESIGNGEN_VERSION,
                codegen: support(SUPPORT_CRATES[0]),
                design: support(SUPPORT_CRATES[1]),
                generators: support(SUPPORT_CRATES[2]),
                design_crate: DESIGN_DEPENDENCY,
                design_package: quoted(&self.spec.design.package),
                design_path: quoted(&self.spec.design.dir.to_string_lossy()),
            },
        )
        .render()
    }
}

/// A TOML basic string, escaped.
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
