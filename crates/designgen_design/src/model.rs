//! The evaluated design: APIs, their services and endpoints, and the user types they exchange.

use std::fmt;

/// One evaluated API definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Api {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// API version advertised in generated documents (defaults to `1.0`).
    pub version: String,
    pub types: Vec<UserType>,
    pub services: Vec<Service>,
}

impl Api {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            version: "1.0".to_string(),
            types: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn user_type(&self, name: &str) -> Option<&UserType> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// A named object type with ordered fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

impl UserType {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
    pub description: Option<String>,
}

/// Type of a field or endpoint result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Boolean,
    Integer,
    Number,
    String,
    List(Box<FieldType>),
    /// Reference to a [`UserType`] of the same API, by name.
    Ref(String),
}

impl FieldType {
    pub fn list(of: FieldType) -> Self {
        Self::List(Box::new(of))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    /// The user type this type refers to, looking through lists.
    pub fn referenced(&self) -> Option<&str> {
        match self {
            Self::List(inner) => inner.referenced(),
            Self::Ref(name) => Some(name),
            Self::Boolean | Self::Integer | Self::Number | Self::String => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::List(inner) => write!(f, "list of {inner}"),
            Self::Ref(name) => f.write_str(name),
        }
    }
}

/// A group of endpoints generated into one service trait, transport and client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub description: Option<String>,
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub description: Option<String>,
    pub method: HttpMethod,
    /// Route template such as `/accounts/{id}`.
    pub path: String,
    /// Name of the user type carrying the endpoint's input (path parameters included).
    pub payload: Option<String>,
    /// Response body; `None` means an empty `204` response.
    pub result: Option<FieldType>,
}

impl Endpoint {
    /// Names of the `{param}` segments of the route, in order.
    pub fn path_params(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests carry a body; bodiless endpoints take all input from the path.
    pub fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
