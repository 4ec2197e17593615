//! Server generator: per service, the exchanged types and a service trait (`service/<svc>.rs`) plus an axum router
//! delegating to that trait (`transport/<svc>_http.rs`).

use designgen_codegen::{File, ImportSpec, Section, Template};
use designgen_design::Root;
use serde::Serialize;

use crate::GeneratorError;
use crate::rust::{RustFile, ServiceDef, SiblingImport, TYPES, module_index, services};

static SERVICE: Template = Template::new("service.rs", include_str!("templates/service.rs.jinja"));
static TRANSPORT: Template = Template::new("transport.rs", include_str!("templates/transport.rs.jinja"));

#[derive(Serialize)]
struct RouteHandler<'a> {
    verb: &'a str,
    handler: &'a str,
}

/// Endpoints sharing a route path, which axum registers once.
#[derive(Serialize)]
struct Route<'a> {
    path: &'a str,
    handlers: Vec<RouteHandler<'a>>,
}

#[derive(Serialize)]
struct TransportData<'a> {
    #[serde(flatten)]
    service: &'a ServiceDef,
    routes: Vec<Route<'a>>,
}

pub fn generate(roots: &[Root]) -> Result<Vec<Box<dyn File>>, GeneratorError> {
    let services = services("server", roots)?;
    let mut files: Vec<Box<dyn File>> = Vec::new();
    let mut service_modules = Vec::new();
    let mut transport_modules = Vec::new();

    for service_ref in &services {
        let def = ServiceDef::build(service_ref);
        files.push(Box::new(service_file(&def, &service_ref.module)));
        files.push(Box::new(transport_file(&def, &service_ref.module)));
        service_modules.push(def.module.clone());
        transport_modules.push(format!("{}_http", service_ref.module));
    }

    files.push(Box::new(module_index("service", "service modules", &service_modules)));
    files.push(Box::new(module_index("transport", "HTTP transport modules", &transport_modules)));
    tracing::debug!(files = files.len(), "server generator done");
    Ok(files)
}

fn service_file(def: &ServiceDef, module: &str) -> RustFile {
    let mut file = RustFile::new(format!("service/{module}.rs"), format!("{} service", def.name));
    file.imports = vec![
        ImportSpec::new("serde::{Deserialize, Serialize}"),
        ImportSpec::new("std::fmt"),
    ];
    file.body = vec![Section::new(&TYPES, def), Section::new(&SERVICE, def)];
    file
}

fn transport_file(def: &ServiceDef, module: &str) -> RustFile {
    let mut file = RustFile::new(format!("transport/{module}_http.rs"), format!("{} HTTP transport", def.name));
    file.imports = vec![
        ImportSpec::new("std::sync::Arc"),
        ImportSpec::new("axum::extract::{Path, State}"),
        ImportSpec::new("axum::http::StatusCode"),
        ImportSpec::new("axum::response::Response"),
        ImportSpec::anonymous("axum::response::IntoResponse"),
        ImportSpec::new("axum::routing"),
        ImportSpec::new("axum::{Json, Router}"),
        ImportSpec::new("serde::Serialize"),
    ];
    file.siblings = vec![SiblingImport {
        module: format!("service::{}", def.module),
        names: def.exported_names(),
    }];
    file.body = vec![Section::new(
        &TRANSPORT,
        TransportData {
            service: def,
            routes: routes(def),
        },
    )];
    file
}

fn routes(def: &ServiceDef) -> Vec<Route<'_>> {
    let mut routes: Vec<Route<'_>> = Vec::new();
    for endpoint in &def.endpoints {
        let handler = RouteHandler {
            verb: &endpoint.verb,
            handler: &endpoint.handler,
        };
        match routes.iter_mut().find(|route| route.path == endpoint.path) {
            Some(route) => route.handlers.push(handler),
            None => routes.push(Route {
                path: &endpoint.path,
                handlers: vec![handler],
            }),
        }
    }
    routes
}
