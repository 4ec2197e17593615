//! Shared pieces of the Rust-emitting generators: the generic Rust file, type mapping, and the template data built
//! from the design model.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use designgen_codegen::naming::{escape_keyword, to_pascal_case, to_snake_case};
use designgen_codegen::{
    CollisionPolicy, File, ImportSpec, Namespace, PathConflict, Section, Template, header, resolve_path,
};
use designgen_design::{Api, Endpoint, FieldType, HttpMethod, Root, Service};
use serde::Serialize;

use crate::GeneratorError;

pub(crate) static TYPES: Template = Template::new("types.rs", include_str!("templates/types.rs.jinja"));
static MODULE_INDEX: Template = Template::new("mod.rs", include_str!("templates/mod.rs.jinja"));

/// Imports of a sibling generated module, relative to the output namespace.
pub(crate) struct SiblingImport {
    pub module: String,
    pub names: Vec<String>,
}

/// A generated `.rs` file: banner and imports, then body sections.
pub(crate) struct RustFile {
    pub path: PathBuf,
    pub title: String,
    pub banner: fn(&str, &[ImportSpec]) -> Section,
    pub imports: Vec<ImportSpec>,
    pub siblings: Vec<SiblingImport>,
    pub body: Vec<Section>,
}

impl RustFile {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            banner: header,
            imports: Vec::new(),
            siblings: Vec::new(),
            body: Vec::new(),
        }
    }
}

impl File for RustFile {
    fn sections(&self, namespace: &Namespace) -> Vec<Section> {
        let mut imports = self.imports.clone();
        imports.extend(self.siblings.iter().filter(|s| !s.names.is_empty()).map(|sibling| {
            ImportSpec::new(format!(
                "{}::{{{}}}",
                namespace.qualify(&sibling.module),
                sibling.names.join(", ")
            ))
        }));

        let mut sections = vec![(self.banner)(&self.title, &imports)];
        sections.extend(self.body.iter().cloned());
        sections
    }

    fn output_path(&self, reserved: &BTreeSet<PathBuf>) -> Result<PathBuf, PathConflict> {
        resolve_path(self.path.clone(), reserved, CollisionPolicy::Fail)
    }
}

#[derive(Serialize)]
struct ModuleIndexData<'a> {
    modules: &'a [String],
}

/// `dir/mod.rs` declaring one public module per entry.
pub(crate) fn module_index(dir: &str, title: &str, modules: &[String]) -> RustFile {
    let mut file = RustFile::new(format!("{dir}/mod.rs"), title);
    file.body.push(Section::new(&MODULE_INDEX, ModuleIndexData { modules }));
    file
}

/// A service together with the API that defines it.
pub(crate) struct ServiceRef<'a> {
    pub api: &'a Api,
    pub service: &'a Service,
    /// File and module name of the service (`snake_case`, unescaped).
    pub module: String,
}

/// Every service of every root, in design order. Two services mapping to the same module name cannot share an output
/// directory and are rejected.
pub(crate) fn services<'a>(generator: &'static str, roots: &'a [Root]) -> Result<Vec<ServiceRef<'a>>, GeneratorError> {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    let mut services = Vec::new();
    for root in roots {
        let Root::Api(api) = root;
        for service in &api.services {
            let module = to_snake_case(&service.name);
            if let Some(owner) = owners.insert(module.clone(), &api.name) {
                return Err(GeneratorError::new(
                    generator,
                    format!(
                        "service \"{}\" of API \"{}\" maps to module `{module}`, already used by API \"{owner}\"",
                        service.name, api.name
                    ),
                ));
            }
            services.push(ServiceRef { api, service, module });
        }
    }
    Ok(services)
}

pub(crate) fn rust_type(ty: &FieldType) -> String {
    match ty {
        FieldType::Boolean => "bool".to_string(),
        FieldType::Integer => "i64".to_string(),
        FieldType::Number => "f64".to_string(),
        FieldType::String => "String".to_string(),
        FieldType::List(inner) => format!("Vec<{}>", rust_type(inner)),
        FieldType::Ref(name) => to_pascal_case(name),
    }
}

/// Identifier of a field, parameter or method named `name` in the design.
pub(crate) fn ident(name: &str) -> String {
    escape_keyword(&to_snake_case(name))
}

/// A Rust string literal with the given content.
pub(crate) fn literal(text: &str) -> String {
    format!("{text:?}")
}

fn doc(description: Option<&str>) -> Vec<String> {
    description.map(|d| d.lines().map(str::to_string).collect()).unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub(crate) struct TypeDef {
    pub name: String,
    doc: Vec<String>,
    fields: Vec<FieldDef>,
}

#[derive(Debug, Serialize)]
struct FieldDef {
    ident: String,
    /// Wire name literal, when it differs from the identifier.
    rename: Option<String>,
    ty: String,
    doc: Vec<String>,
    optional: bool,
    /// Filled from the path rather than the body.
    default: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ParamDef {
    ident: String,
    ty: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EndpointDef {
    /// Trait and client method name.
    pub method: String,
    /// Transport handler function name.
    pub handler: String,
    /// `service.endpoint` as a string literal.
    qualified: String,
    doc: Vec<String>,
    /// Lowercase HTTP method, as used by axum and reqwest.
    pub verb: String,
    /// Route literal (`"/accounts/{id}"`).
    pub path: String,
    /// Client URL format literal (`"{}/accounts/{}"`, base URL first).
    url_format: String,
    params: Vec<ParamDef>,
    payload: Option<String>,
    body: bool,
    result: Option<String>,
    returns: String,
    status: &'static str,
}

/// Template data describing one service.
#[derive(Debug, Serialize)]
pub(crate) struct ServiceDef {
    pub name: String,
    pub module: String,
    pub trait_name: String,
    pub client_name: String,
    pub handler_name: String,
    doc: Vec<String>,
    pub types: Vec<TypeDef>,
    pub endpoints: Vec<EndpointDef>,
}

impl ServiceDef {
    pub fn build(service_ref: &ServiceRef<'_>) -> Self {
        let ServiceRef { api, service, module } = service_ref;
        let pascal = to_pascal_case(&service.name);
        Self {
            name: service.name.clone(),
            module: escape_keyword(module),
            trait_name: format!("{pascal}Service"),
            client_name: format!("{pascal}Client"),
            handler_name: format!("{pascal}Handler"),
            doc: doc(service.description.as_deref()),
            types: type_defs(api, service),
            endpoints: service
                .endpoints
                .iter()
                .map(|endpoint| endpoint_def(api, service, endpoint))
                .collect(),
        }
    }

    /// Names a sibling module can import from the service module.
    pub fn exported_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|t| t.name.clone()).collect();
        names.push(self.trait_name.clone());
        names.push("ServiceError".to_string());
        names
    }
}

/// The user types a service exchanges, including the types they reference, in design order.
fn type_defs(api: &Api, service: &Service) -> Vec<TypeDef> {
    let mut pending: Vec<&str> = service
        .endpoints
        .iter()
        .flat_map(|e| e.payload.as_deref().into_iter().chain(e.result.as_ref().and_then(FieldType::referenced)))
        .collect();
    let mut used = BTreeSet::new();
    while let Some(name) = pending.pop() {
        if !used.insert(name) {
            continue;
        }
        if let Some(user_type) = api.user_type(name) {
            pending.extend(user_type.fields.iter().filter_map(|f| f.ty.referenced()));
        }
    }

    // Path parameters of body endpoints are taken from the route, so the body may omit them.
    let from_path: BTreeSet<(&str, &str)> = service
        .endpoints
        .iter()
        .filter(|e| e.method.has_body())
        .filter_map(|e| e.payload.as_deref().map(|payload| (payload, e.path_params())))
        .flat_map(|(payload, params)| params.into_iter().map(move |param| (payload, param)))
        .collect();

    api.types
        .iter()
        .filter(|t| used.contains(t.name.as_str()))
        .map(|t| TypeDef {
            name: to_pascal_case(&t.name),
            doc: doc(t.description.as_deref()),
            fields: t
                .fields
                .iter()
                .map(|field| {
                    let ident = ident(&field.name);
                    let ty = rust_type(&field.ty);
                    FieldDef {
                        rename: (ident != field.name).then(|| literal(&field.name)),
                        ty: if field.required { ty } else { format!("Option<{ty}>") },
                        doc: doc(field.description.as_deref()),
                        optional: !field.required,
                        default: from_path.contains(&(t.name.as_str(), field.name.as_str())),
                        ident,
                    }
                })
                .collect(),
        })
        .collect()
}

fn endpoint_def(api: &Api, service: &Service, endpoint: &Endpoint) -> EndpointDef {
    let payload_type = endpoint.payload.as_deref().and_then(|name| api.user_type(name));
    let params = endpoint
        .path_params()
        .into_iter()
        .map(|param| ParamDef {
            ident: ident(param),
            ty: payload_type
                .and_then(|t| t.field(param))
                .map(|f| rust_type(&f.ty))
                .unwrap_or_else(|| "String".to_string()),
        })
        .collect();

    let url_format = endpoint
        .path
        .split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    let result = endpoint.result.as_ref().map(rust_type);
    let status = match (&result, endpoint.method) {
        (None, _) => "NO_CONTENT",
        (Some(_), HttpMethod::Post) => "CREATED",
        (Some(_), _) => "OK",
    };

    EndpointDef {
        method: ident(&endpoint.name),
        handler: format!("handle_{}", to_snake_case(&endpoint.name)),
        qualified: literal(&format!("{}.{}", service.name, endpoint.name)),
        doc: doc(endpoint.description.as_deref()),
        verb: endpoint.method.as_str().to_lowercase(),
        path: literal(&endpoint.path),
        url_format: literal(&format!("{{}}{url_format}")),
        params,
        payload: endpoint.payload.as_deref().map(to_pascal_case),
        body: endpoint.method.has_body() && endpoint.payload.is_some(),
        returns: result.clone().unwrap_or_else(|| "()".to_string()),
        result,
        status,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use designgen_design::Context;

    use super::*;

    /// Drop all whitespace, so assertions do not depend on line breaking.
    pub(crate) fn squash(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// The account API used across generator tests.
    pub(crate) fn account_roots() -> Vec<Root> {
        let mut ctx = Context::new();
        ctx.api("account", |api| {
            api.title("Account API").description("Manage accounts.");
            api.user_type("Account", |t| {
                t.description("A customer account.");
                t.required("id", FieldType::Integer);
                t.required("name", FieldType::String);
                t.field("ownerEmail", FieldType::String);
                t.field("type", FieldType::String);
            });
            api.user_type("CreatePayload", |t| {
                t.required("name", FieldType::String);
            });
            api.user_type("IdPayload", |t| {
                t.required("id", FieldType::Integer);
            });
            api.service("account", |svc| {
                svc.description("Account management.");
                svc.endpoint("create", HttpMethod::Post, "/accounts", |e| {
                    e.payload("CreatePayload").result(FieldType::reference("Account"));
                });
                svc.endpoint("list", HttpMethod::Get, "/accounts", |e| {
                    e.result(FieldType::list(FieldType::reference("Account")));
                });
                svc.endpoint("show", HttpMethod::Get, "/accounts/{id}", |e| {
                    e.description("Fetch one account.")
                        .payload("IdPayload")
                        .result(FieldType::reference("Account"));
                });
                svc.endpoint("delete", HttpMethod::Delete, "/accounts/{id}", |e| {
                    e.payload("IdPayload");
                });
            });
        });
        ctx.evaluate().unwrap();
        ctx.roots().unwrap().to_vec()
    }

    #[test]
    fn test_service_def() {
        let roots = account_roots();
        let refs = services("server", &roots).unwrap();
        let def = ServiceDef::build(&refs[0]);

        assert_eq!(def.trait_name, "AccountService");
        let types: Vec<&str> = def.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(types, ["Account", "CreatePayload", "IdPayload"]);

        let account = &def.types[0];
        assert_eq!(account.fields[2].ident, "owner_email");
        assert_eq!(account.fields[2].rename.as_deref(), Some("\"ownerEmail\""));
        assert_eq!(account.fields[2].ty, "Option<String>");
        assert_eq!(account.fields[3].ident, "r#type");

        let show = &def.endpoints[2];
        assert_eq!(show.handler, "handle_show");
        assert_eq!(show.url_format, "\"{}/accounts/{}\"");
        assert_eq!(show.status, "OK");
        assert!(!show.body);
        assert_eq!(def.endpoints[0].status, "CREATED");
        assert_eq!(def.endpoints[3].returns, "()");
    }

    #[test]
    fn test_services_reject_module_clashes() {
        let mut roots = account_roots();
        let Root::Api(api) = roots[0].clone();
        let mut other = api.clone();
        other.name = "billing".into();
        roots.push(Root::Api(other));

        let err = services("client", &roots).err().unwrap();
        assert_eq!(err.generator, "client");
        assert!(err.message.contains("already used by API \"account\""));
    }
}
