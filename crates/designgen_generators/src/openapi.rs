//! OpenAPI generator: one OpenAPI 3.0.3 document per API root.
//!
//! The document is built as a `serde_json` value; object keys come out sorted, which keeps the output stable.

use std::collections::BTreeSet;
use std::path::PathBuf;

use designgen_codegen::{CollisionPolicy, File, Namespace, PathConflict, Section, Template, resolve_path};
use designgen_design::{Api, Endpoint, FieldType, HttpMethod, Root, UserType};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::GeneratorError;

static DOCUMENT: Template = Template::new("openapi.json", include_str!("templates/openapi.json.jinja"));

#[derive(Serialize)]
struct DocumentData {
    document: String,
}

/// `openapi.json`; further APIs of the same design diverge to `openapi_2.json` and up.
struct DocumentFile {
    document: String,
}

impl File for DocumentFile {
    fn sections(&self, _: &Namespace) -> Vec<Section> {
        vec![Section::new(
            &DOCUMENT,
            DocumentData {
                document: self.document.clone(),
            },
        )]
    }

    fn output_path(&self, reserved: &BTreeSet<PathBuf>) -> Result<PathBuf, PathConflict> {
        resolve_path("openapi.json", reserved, CollisionPolicy::Suffix)
    }
}

pub fn generate(roots: &[Root]) -> Result<Vec<Box<dyn File>>, GeneratorError> {
    roots
        .iter()
        .map(|root| {
            let Root::Api(api) = root;
            let document = serde_json::to_string_pretty(&document(api))
                .map_err(|err| GeneratorError::new("openapi", format!("API \"{}\": {err}", api.name)))?;
            Ok(Box::new(DocumentFile { document }) as Box<dyn File>)
        })
        .collect()
}

fn document(api: &Api) -> Value {
    let mut info = Map::new();
    info.insert("title".into(), json!(api.title.as_deref().unwrap_or(&api.name)));
    info.insert("version".into(), json!(api.version));
    if let Some(description) = &api.description {
        info.insert("description".into(), json!(description));
    }

    let mut paths = Map::new();
    for service in &api.services {
        for endpoint in &service.endpoints {
            let item = paths
                .entry(endpoint.path.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(item) = item {
                item.insert(
                    endpoint.method.as_str().to_lowercase(),
                    operation(api, &service.name, endpoint),
                );
            }
        }
    }

    let schemas: Map<String, Value> = api.types.iter().map(|t| (t.name.clone(), type_schema(t))).collect();

    json!({
        "openapi": "3.0.3",
        "info": info,
        "paths": paths,
        "components": { "schemas": schemas },
    })
}

fn operation(api: &Api, service: &str, endpoint: &Endpoint) -> Value {
    let mut op = Map::new();
    op.insert("operationId".into(), json!(format!("{service}#{}", endpoint.name)));
    op.insert("tags".into(), json!([service]));
    if let Some(description) = &endpoint.description {
        op.insert("description".into(), json!(description));
    }

    let payload = endpoint.payload.as_deref().and_then(|name| api.user_type(name));
    let params = endpoint.path_params();
    if !params.is_empty() {
        let parameters: Vec<Value> = params
            .iter()
            .map(|param| {
                let schema = payload
                    .and_then(|p| p.field(param))
                    .map(|f| schema(&f.ty))
                    .unwrap_or_else(|| json!({ "type": "string" }));
                json!({ "name": param, "in": "path", "required": true, "schema": schema })
            })
            .collect();
        op.insert("parameters".into(), json!(parameters));
    }

    if let (Some(name), true) = (&endpoint.payload, endpoint.method.has_body()) {
        op.insert(
            "requestBody".into(),
            json!({
                "required": true,
                "content": { "application/json": { "schema": reference(name) } },
            }),
        );
    }

    let (status, response) = match &endpoint.result {
        None => ("204", json!({ "description": "No Content" })),
        Some(result) => {
            let (status, description) = if endpoint.method == HttpMethod::Post {
                ("201", "Created")
            } else {
                ("200", "OK")
            };
            let response = json!({
                "description": description,
                "content": { "application/json": { "schema": schema(result) } },
            });
            (status, response)
        }
    };
    let mut responses = Map::new();
    responses.insert(status.into(), response);
    op.insert("responses".into(), Value::Object(responses));
    Value::Object(op)
}

fn type_schema(user_type: &UserType) -> Value {
    let properties: Map<String, Value> = user_type
        .fields
        .iter()
        .map(|field| {
            let mut property = schema(&field.ty);
            if let (Some(description), Value::Object(object)) = (&field.description, &mut property) {
                object.insert("description".into(), json!(description));
            }
            (field.name.clone(), property)
        })
        .collect();
    let required: Vec<&str> = user_type
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect();

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    if let Some(description) = &user_type.description {
        schema.insert("description".into(), json!(description));
    }
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    Value::Object(schema)
}

fn schema(ty: &FieldType) -> Value {
    match ty {
        FieldType::Boolean => json!({ "type": "boolean" }),
        FieldType::Integer => json!({ "type": "integer", "format": "int64" }),
        FieldType::Number => json!({ "type": "number", "format": "double" }),
        FieldType::String => json!({ "type": "string" }),
        FieldType::List(inner) => json!({ "type": "array", "items": schema(inner) }),
        FieldType::Ref(name) => reference(name),
    }
}

fn reference(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}
