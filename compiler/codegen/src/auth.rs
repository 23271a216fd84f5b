//! Authentication schemes supported by generated clients.
//!
//! | security scheme                  | config record       |
//! |----------------------------------|---------------------|
//! | `httpApiKey` / `apiKey`          | `ApiKeysConfig`     |
//! | `http` + `bearer`                | `BearerTokenConfig` |
//! | `http` + `basic`, `userPassword` | `CredentialsConfig` |

use std::collections::BTreeMap;

use ir::{FieldDefinition, PrimitiveType, SecurityScheme, TypeDefinition, TypeRef, TypeShape};

/// Where an API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLocation {
    /// Handshake request header
    Header,
    /// Connection URL query parameter
    Query,
}

/// A supported authentication scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// Static API key
    ApiKey {
        /// Key under `securitySchemes`
        scheme: String,
        /// Header or query parameter name
        name: String,
        /// Where the key is sent
        location: KeyLocation,
    },
    /// `Authorization: Bearer <token>`
    Bearer {
        /// Key under `securitySchemes`
        scheme: String,
    },
    /// `Authorization: Basic <user:password>`
    Credentials {
        /// Key under `securitySchemes`
        scheme: String,
    },
}

/// Outcome of picking a scheme from the declared ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSelection {
    /// The selected scheme, if any is supported
    pub scheme: Option<AuthScheme>,
    /// Schemes that were skipped, and why
    pub warnings: Vec<String>,
}

impl AuthScheme {
    /// Interpret a declared security scheme; `None` when unsupported.
    pub fn from_security_scheme(key: &str, declared: &SecurityScheme) -> Option<Self> {
        let scheme = key.to_string();
        match declared.kind.as_str() {
            "httpApiKey" | "apiKey" => {
                let location = match declared.location.as_deref() {
                    Some("header") => KeyLocation::Header,
                    Some("query") => KeyLocation::Query,
                    _ => return None,
                };
                let name = declared.name.clone().unwrap_or_else(|| key.to_string());
                Some(AuthScheme::ApiKey { scheme, name, location })
            }
            "http" => match declared.scheme.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("bearer") => Some(AuthScheme::Bearer { scheme }),
                Some("basic") => Some(AuthScheme::Credentials { scheme }),
                _ => None,
            },
            "userPassword" => Some(AuthScheme::Credentials { scheme }),
            _ => None,
        }
    }

    /// Key of the scheme under `securitySchemes`
    pub fn scheme_name(&self) -> &str {
        match self {
            AuthScheme::ApiKey { scheme, .. }
            | AuthScheme::Bearer { scheme }
            | AuthScheme::Credentials { scheme } => scheme,
        }
    }

    /// Name of the generated config record
    pub fn config_type(&self) -> &'static str {
        match self {
            AuthScheme::ApiKey { .. } => "ApiKeysConfig",
            AuthScheme::Bearer { .. } => "BearerTokenConfig",
            AuthScheme::Credentials { .. } => "CredentialsConfig",
        }
    }

    /// The config record, registered before any schema is lowered.
    pub fn definition(&self) -> TypeDefinition {
        let (description, fields) = match self {
            AuthScheme::ApiKey { name, location, .. } => {
                let carrier = match location {
                    KeyLocation::Header => "header",
                    KeyLocation::Query => "query parameter",
                };
                (format!("API key sent in the `{}` {}", name, carrier), vec![string_field("api_key", "apiKey")])
            }
            AuthScheme::Bearer { .. } => {
                ("Bearer token sent in the `Authorization` header".to_string(), vec![string_field("token", "token")])
            }
            AuthScheme::Credentials { .. } => (
                "User name and password sent as basic credentials".to_string(),
                vec![string_field("username", "username"), string_field("password", "password")],
            ),
        };
        TypeDefinition {
            name: self.config_type().to_string(),
            description: Some(description),
            shape: TypeShape::Record { fields },
            sub_definitions: Vec::new(),
            origin: format!("#/components/securitySchemes/{}", ir::pointer::escape_segment(self.scheme_name())),
        }
    }

    /// Whether the scheme sets handshake headers
    pub fn uses_headers(&self) -> bool {
        !matches!(self, AuthScheme::ApiKey { location: KeyLocation::Query, .. })
    }

    /// `use` lines the client needs for this scheme
    pub(crate) fn imports(&self) -> Vec<&'static str> {
        match self {
            AuthScheme::ApiKey { location: KeyLocation::Header, .. } => {
                vec!["use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};"]
            }
            AuthScheme::ApiKey { location: KeyLocation::Query, .. } => Vec::new(),
            AuthScheme::Bearer { .. } => {
                vec!["use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};"]
            }
            AuthScheme::Credentials { .. } => vec![
                "use base64::engine::general_purpose::STANDARD;",
                "use base64::Engine as _;",
                "use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};",
            ],
        }
    }

    /// Statements rewriting `url` before the handshake request is built
    pub(crate) fn url_statements(&self) -> Option<String> {
        match self {
            AuthScheme::ApiKey { name, location: KeyLocation::Query, .. } => Some(format!(
                "        let separator = if url.contains('?') {{ '&' }} else {{ '?' }};\n\
                 \x20       let url = format!(\"{{}}{{}}{{}}={{}}\", url, separator, {:?}, encode_uri_component(&auth.api_key));\n",
                name
            )),
            _ => None,
        }
    }

    /// Statements decorating `request` with credentials
    pub(crate) fn request_statements(&self) -> Option<String> {
        match self {
            AuthScheme::ApiKey { location: KeyLocation::Query, .. } => None,
            AuthScheme::ApiKey { name, location: KeyLocation::Header, .. } => Some(format!(
                "        let header = HeaderName::from_bytes({:?}.as_bytes())\n\
                 \x20           .map_err(|e| ClientError::Connection(e.to_string()))?;\n\
                 \x20       request.headers_mut().insert(header, header_value(&auth.api_key)?);\n",
                name.to_ascii_lowercase()
            )),
            AuthScheme::Bearer { .. } => Some(
                "        request\n\
                 \x20           .headers_mut()\n\
                 \x20           .insert(AUTHORIZATION, header_value(&format!(\"Bearer {}\", auth.token))?);\n"
                    .to_string(),
            ),
            AuthScheme::Credentials { .. } => Some(
                "        let credentials = STANDARD.encode(format!(\"{}:{}\", auth.username, auth.password));\n\
                 \x20       request\n\
                 \x20           .headers_mut()\n\
                 \x20           .insert(AUTHORIZATION, header_value(&format!(\"Basic {}\", credentials))?);\n"
                    .to_string(),
            ),
        }
    }
}

fn string_field(name: &str, wire_name: &str) -> FieldDefinition {
    FieldDefinition {
        name: name.to_string(),
        wire_name: wire_name.to_string(),
        ty: TypeRef::Primitive(PrimitiveType::String),
        required: true,
        description: None,
    }
}

/// Pick the scheme a generated client authenticates with.
///
/// `preferred` names a key under `securitySchemes`; without it, or when it
/// names nothing usable, the first supported scheme in key order wins.
pub fn select_auth(schemes: &BTreeMap<String, SecurityScheme>, preferred: Option<&str>) -> AuthSelection {
    let mut selection = AuthSelection::default();
    let mut supported = Vec::new();
    for (key, declared) in schemes {
        match AuthScheme::from_security_scheme(key, declared) {
            Some(scheme) => supported.push(scheme),
            None => selection.warnings.push(format!(
                "security scheme '{}' of type '{}' is not supported and will be ignored",
                key, declared.kind
            )),
        }
    }

    if let Some(preferred) = preferred {
        if let Some(position) = supported.iter().position(|s| s.scheme_name() == preferred) {
            selection.scheme = Some(supported.swap_remove(position));
            return selection;
        }
        selection
            .warnings
            .push(format!("auth scheme '{}' is not declared or not supported", preferred));
    }
    selection.scheme = supported.into_iter().next();
    selection
}
