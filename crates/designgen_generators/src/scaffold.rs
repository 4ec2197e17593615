//! Scaffold generator: a starting implementation of each service trait (`handlers/<svc>.rs`).
//!
//! Scaffold files belong to the user once written. Drivers write them with
//! [`Writer::write_scaffold`](designgen_codegen::Writer::write_scaffold), which leaves existing files alone; that
//! includes `handlers/mod.rs`, so services added later have to be declared there by hand.

use designgen_codegen::{File, ImportSpec, Section, Template, VERSION};
use designgen_design::Root;
use serde::Serialize;

use crate::GeneratorError;
use crate::rust::{RustFile, ServiceDef, SiblingImport, module_index, services};

static SCAFFOLD: Template = Template::new("scaffold.rs", include_str!("templates/scaffold.rs.jinja"));
static SCAFFOLD_HEADER: Template = Template::new("scaffold_header", include_str!("templates/scaffold_header.jinja"));

#[derive(Serialize)]
struct HeaderData<'a> {
    version: &'static str,
    title: &'a str,
    imports: Vec<String>,
}

/// Banner for files meant to be edited.
fn scaffold_header(title: &str, imports: &[ImportSpec]) -> Section {
    Section::new(
        &SCAFFOLD_HEADER,
        HeaderData {
            version: VERSION,
            title,
            imports: imports.iter().map(ImportSpec::code).collect(),
        },
    )
}

pub fn generate(roots: &[Root]) -> Result<Vec<Box<dyn File>>, GeneratorError> {
    let services = services("scaffold", roots)?;
    let mut files: Vec<Box<dyn File>> = Vec::new();
    let mut modules = Vec::new();

    for service_ref in &services {
        let def = ServiceDef::build(service_ref);
        let mut file = RustFile::new(
            format!("handlers/{}.rs", service_ref.module),
            format!("{} service implementation", def.name),
        );
        file.banner = scaffold_header;
        file.siblings = vec![SiblingImport {
            module: format!("service::{}", def.module),
            names: def.exported_names(),
        }];
        file.body = vec![Section::new(&SCAFFOLD, &def)];
        files.push(Box::new(file));
        modules.push(def.module);
    }

    let mut index = module_index("handlers", "service implementations", &modules);
    index.banner = scaffold_header;
    files.push(Box::new(index));
    Ok(files)
}
