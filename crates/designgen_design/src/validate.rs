//! Design validation.
//!
//! Collects every problem instead of stopping at the first, so one evaluation reports them all.

use std::collections::HashSet;

use crate::eval::EvalError;
use crate::model::{Api, Endpoint, FieldType, Service, UserType};

pub fn validate(apis: &[Api]) -> Vec<EvalError> {
    let mut errors = Vec::new();

    let mut api_names = HashSet::new();
    for api in apis {
        let location = format!("API \"{}\"", api.name);
        check_name(&location, &api.name, &mut errors);
        if !api_names.insert(api.name.as_str()) {
            errors.push(EvalError::new(&location, "API is defined more than once"));
        }
        validate_api(api, &location, &mut errors);
    }

    errors
}

fn validate_api(api: &Api, location: &str, errors: &mut Vec<EvalError>) {
    if api.services.is_empty() {
        errors.push(EvalError::new(location, "API defines no service"));
    }

    let mut type_names = HashSet::new();
    for user_type in &api.types {
        let location = format!("{location} type \"{}\"", user_type.name);
        check_name(&location, &user_type.name, errors);
        if !type_names.insert(user_type.name.as_str()) {
            errors.push(EvalError::new(&location, "type is defined more than once"));
        }
        validate_type(api, user_type, &location, errors);
    }

    let mut service_names = HashSet::new();
    for service in &api.services {
        let location = format!("{location} service \"{}\"", service.name);
        check_name(&location, &service.name, errors);
        if !service_names.insert(service.name.as_str()) {
            errors.push(EvalError::new(&location, "service is defined more than once"));
        }
        validate_service(api, service, &location, errors);
    }
}

fn validate_type(api: &Api, user_type: &UserType, location: &str, errors: &mut Vec<EvalError>) {
    let mut field_names = HashSet::new();
    for field in &user_type.fields {
        let location = format!("{location} field \"{}\"", field.name);
        check_name(&location, &field.name, errors);
        if !field_names.insert(field.name.as_str()) {
            errors.push(EvalError::new(&location, "field is defined more than once"));
        }
        check_reference(api, &field.ty, &location, errors);
    }
}

fn validate_service(api: &Api, service: &Service, location: &str, errors: &mut Vec<EvalError>) {
    if service.endpoints.is_empty() {
        errors.push(EvalError::new(location, "service defines no endpoint"));
    }

    let mut endpoint_names = HashSet::new();
    let mut routes = HashSet::new();
    for endpoint in &service.endpoints {
        let location = format!("{location} endpoint \"{}\"", endpoint.name);
        check_name(&location, &endpoint.name, errors);
        if !endpoint_names.insert(endpoint.name.as_str()) {
            errors.push(EvalError::new(&location, "endpoint is defined more than once"));
        }
        if !routes.insert((endpoint.method, endpoint.path.as_str())) {
            errors.push(EvalError::new(
                &location,
                format!("route {} {} is already used by another endpoint", endpoint.method, endpoint.path),
            ));
        }
        validate_endpoint(api, endpoint, &location, errors);
    }
}

fn validate_endpoint(api: &Api, endpoint: &Endpoint, location: &str, errors: &mut Vec<EvalError>) {
    if !endpoint.path.starts_with('/') {
        errors.push(EvalError::new(location, format!("path \"{}\" must start with '/'", endpoint.path)));
    }
    if let Some(result) = &endpoint.result {
        check_reference(api, result, location, errors);
    }

    let params = endpoint.path_params();
    let payload = match &endpoint.payload {
        Some(name) => match api.user_type(name) {
            Some(payload) => Some(payload),
            None => {
                errors.push(EvalError::new(location, format!("payload type \"{name}\" is not defined")));
                return;
            }
        },
        None => None,
    };

    for param in &params {
        let field = payload.and_then(|p| p.field(param));
        match field {
            None => errors.push(EvalError::new(
                location,
                format!("path parameter \"{param}\" is not a field of the payload"),
            )),
            Some(field) if !is_scalar(&field.ty) => errors.push(EvalError::new(
                location,
                format!("path parameter \"{param}\" must be a boolean, integer, number or string"),
            )),
            Some(field) if !field.required => errors.push(EvalError::new(
                location,
                format!("path parameter \"{param}\" must be a required field"),
            )),
            Some(_) => {}
        }
    }

    if let Some(payload) = payload {
        if !endpoint.method.has_body() {
            for field in payload.fields.iter().filter(|f| !params.contains(&f.name.as_str())) {
                errors.push(EvalError::new(
                    location,
                    format!(
                        "{} endpoints have no request body; payload field \"{}\" must be a path parameter",
                        endpoint.method, field.name
                    ),
                ));
            }
        }
    }
}

fn check_reference(api: &Api, ty: &FieldType, location: &str, errors: &mut Vec<EvalError>) {
    if let Some(name) = ty.referenced() {
        if api.user_type(name).is_none() {
            errors.push(EvalError::new(location, format!("type \"{name}\" is not defined")));
        }
    }
}

/// Names become Rust identifiers and URL segments; they must start with a letter.
fn check_name(location: &str, name: &str, errors: &mut Vec<EvalError>) {
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        errors.push(EvalError::new(
            location,
            "name must start with a letter and contain only letters, digits, '_' or '-'",
        ));
    }
}

fn is_scalar(ty: &FieldType) -> bool {
    matches!(
        ty,
        FieldType::Boolean | FieldType::Integer | FieldType::Number | FieldType::String
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, HttpMethod};

    fn field(name: &str, ty: FieldType) -> Field {
        Field {
            name: name.into(),
            ty,
            required: true,
            description: None,
        }
    }

    fn endpoint(name: &str, method: HttpMethod, path: &str, payload: Option<&str>) -> Endpoint {
        Endpoint {
            name: name.into(),
            description: None,
            method,
            path: path.into(),
            payload: payload.map(Into::into),
            result: None,
        }
    }

    fn api(types: Vec<UserType>, endpoints: Vec<Endpoint>) -> Api {
        let mut api = Api::new("account");
        api.types = types;
        api.services.push(Service {
            name: "account".into(),
            description: None,
            endpoints,
        });
        api
    }

    fn messages(apis: &[Api]) -> Vec<String> {
        validate(apis).into_iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_valid_design_has_no_errors() {
        let show = UserType {
            name: "ShowPayload".into(),
            description: None,
            fields: vec![field("id", FieldType::Integer)],
        };
        let api = api(vec![show], vec![endpoint("show", HttpMethod::Get, "/accounts/{id}", Some("ShowPayload"))]);
        assert!(validate(&[api]).is_empty());
    }

    #[test]
    fn test_bodiless_methods_take_input_from_the_path_only() {
        let payload = UserType {
            name: "DeletePayload".into(),
            description: None,
            fields: vec![field("id", FieldType::Integer), field("force", FieldType::Boolean)],
        };
        let api = api(
            vec![payload],
            vec![endpoint("delete", HttpMethod::Delete, "/accounts/{id}", Some("DeletePayload"))],
        );
        let errors = messages(&[api]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("payload field \"force\" must be a path parameter"), "{errors:?}");
    }

    #[test]
    fn test_all_problems_are_reported() {
        let broken = UserType {
            name: "Broken".into(),
            description: None,
            fields: vec![field("owner", FieldType::reference("User")), field("owner", FieldType::String)],
        };
        let api = api(
            vec![broken],
            vec![
                endpoint("show", HttpMethod::Get, "/accounts/{id}", None),
                endpoint("show", HttpMethod::Get, "accounts", Some("Missing")),
            ],
        );
        let errors = messages(&[api.clone(), api]);

        let expect = [
            "API is defined more than once",
            "type \"User\" is not defined",
            "field is defined more than once",
            "path parameter \"id\" is not a field of the payload",
            "endpoint is defined more than once",
            "path \"accounts\" must start with '/'",
            "payload type \"Missing\" is not defined",
        ];
        for message in expect {
            assert!(errors.iter().any(|e| e.contains(message)), "missing {message:?} in {errors:?}");
        }
    }

    #[test]
    fn test_empty_service_and_bad_names() {
        let mut api = Api::new("9lives");
        api.services.push(Service {
            name: "account".into(),
            description: None,
            endpoints: Vec::new(),
        });
        let errors = messages(&[api]);
        assert!(errors.iter().any(|e| e.contains("service defines no endpoint")));
        assert!(errors.iter().any(|e| e.starts_with("API \"9lives\": name must start with a letter")));
    }
}
