//! The builder DSL design crates describe their API with.
//!
//! Builders only record; nothing is checked until [`Context::evaluate`](crate::Context::evaluate), which reports every
//! problem at once.
//!
//! ```rust
//! use designgen_design::{Context, FieldType, HttpMethod};
//!
//! let mut ctx = Context::new();
//! ctx.api("account", |api| {
//!     api.title("Account API");
//!     api.user_type("Account", |t| {
//!         t.required("id", FieldType::Integer);
//!         t.field("name", FieldType::String);
//!     });
//!     api.user_type("ShowPayload", |t| {
//!         t.required("id", FieldType::Integer);
//!     });
//!     api.service("account", |svc| {
//!         svc.endpoint("show", HttpMethod::Get, "/accounts/{id}", |e| {
//!             e.payload("ShowPayload").result(FieldType::reference("Account"));
//!         });
//!     });
//! });
//! ctx.evaluate().unwrap();
//! assert_eq!(ctx.roots().unwrap().len(), 1);
//! ```

use crate::model::{Api, Endpoint, Field, FieldType, HttpMethod, Service, UserType};

pub struct ApiBuilder<'a> {
    api: &'a mut Api,
}

impl<'a> ApiBuilder<'a> {
    pub(crate) fn new(api: &'a mut Api) -> Self {
        Self { api }
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.api.title = Some(title.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.api.description = Some(description.into());
        self
    }

    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.api.version = version.into();
        self
    }

    pub fn user_type(&mut self, name: impl Into<String>, define: impl FnOnce(&mut TypeBuilder)) -> &mut Self {
        let mut user_type = UserType {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        };
        define(&mut TypeBuilder { ty: &mut user_type });
        self.api.types.push(user_type);
        self
    }

    pub fn service(&mut self, name: impl Into<String>, define: impl FnOnce(&mut ServiceBuilder)) -> &mut Self {
        let mut service = Service {
            name: name.into(),
            description: None,
            endpoints: Vec::new(),
        };
        define(&mut ServiceBuilder { service: &mut service });
        self.api.services.push(service);
        self
    }
}

pub struct TypeBuilder<'a> {
    ty: &'a mut UserType,
}

impl TypeBuilder<'_> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.ty.description = Some(description.into());
        self
    }

    /// An optional field.
    pub fn field(&mut self, name: impl Into<String>, ty: FieldType) -> &mut Self {
        self.push(name.into(), ty, false)
    }

    pub fn required(&mut self, name: impl Into<String>, ty: FieldType) -> &mut Self {
        self.push(name.into(), ty, true)
    }

    fn push(&mut self, name: String, ty: FieldType, required: bool) -> &mut Self {
        self.ty.fields.push(Field {
            name,
            ty,
            required,
            description: None,
        });
        self
    }
}

pub struct ServiceBuilder<'a> {
    service: &'a mut Service,
}

impl ServiceBuilder<'_> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.service.description = Some(description.into());
        self
    }

    pub fn endpoint(
        &mut self,
        name: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
        define: impl FnOnce(&mut EndpointBuilder),
    ) -> &mut Self {
        let mut endpoint = Endpoint {
            name: name.into(),
            description: None,
            method,
            path: path.into(),
            payload: None,
            result: None,
        };
        define(&mut EndpointBuilder { endpoint: &mut endpoint });
        self.service.endpoints.push(endpoint);
        self
    }
}

pub struct EndpointBuilder<'a> {
    endpoint: &'a mut Endpoint,
}

impl EndpointBuilder<'_> {
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.endpoint.description = Some(description.into());
        self
    }

    /// Name of the user type holding the endpoint input.
    pub fn payload(&mut self, type_name: impl Into<String>) -> &mut Self {
        self.endpoint.payload = Some(type_name.into());
        self
    }

    pub fn result(&mut self, ty: FieldType) -> &mut Self {
        self.endpoint.result = Some(ty);
        self
    }
}
