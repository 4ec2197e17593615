//! Client generator: per service, a blocking reqwest client with its own copy of the exchanged types
//! (`client/<svc>.rs`), so client crates never depend on server code.

use designgen_codegen::{File, ImportSpec, Section, Template};
use designgen_design::Root;

use crate::GeneratorError;
use crate::rust::{RustFile, ServiceDef, TYPES, module_index, services};

static CLIENT: Template = Template::new("client.rs", include_str!("templates/client.rs.jinja"));

pub fn generate(roots: &[Root]) -> Result<Vec<Box<dyn File>>, GeneratorError> {
    let services = services("client", roots)?;
    let mut files: Vec<Box<dyn File>> = Vec::new();
    let mut modules = Vec::new();

    for service_ref in &services {
        let def = ServiceDef::build(service_ref);
        let mut file = RustFile::new(
            format!("client/{}.rs", service_ref.module),
            format!("{} client", def.name),
        );
        file.imports = vec![
            ImportSpec::new("std::fmt"),
            ImportSpec::new("reqwest::blocking::Response"),
            ImportSpec::new("serde::de::DeserializeOwned"),
            ImportSpec::new("serde::{Deserialize, Serialize}"),
        ];
        file.body = vec![Section::new(&TYPES, &def), Section::new(&CLIENT, &def)];
        files.push(Box::new(file));
        modules.push(def.module);
    }

    files.push(Box::new(module_index("client", "client modules", &modules)));
    tracing::debug!(files = files.len(), "client generator done");
    Ok(files)
}
