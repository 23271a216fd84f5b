//! Emits a test module and its `Config.toml` for the generated client.
//!
//! Both files are written once and then belong to the user: the tests are
//! ignored placeholders that connect with the values from the config file.

use std::fmt::Write as _;

use ir::{ParamBinding, PrimitiveType, TypeRef, TypeShape};
use naming::NameResolver;
use types::{RustTypeAdapter, TypeAdapter};

use crate::{AuthScheme, GenerationInput, Result};

/// The two halves of a test skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSkeleton {
    /// Rust test module, included by the client module
    pub test_source: String,
    /// TOML the tests read their connection settings from
    pub config: String,
}

/// Generator for the client test skeleton
#[derive(Debug, Default, Clone, Copy)]
pub struct TestSkeletonGenerator;

impl TestSkeletonGenerator {
    /// Render the test module and its config file.
    pub fn generate_skeleton(&self, input: &GenerationInput<'_>) -> Result<TestSkeleton> {
        let params = config_params(input);
        Ok(TestSkeleton { test_source: test_source(input, &params)?, config: config(input, &params)? })
    }
}

/// One path parameter as a `TestConfig` field.
struct ConfigParam<'a> {
    /// Field identifier, distinct across the whole config
    field: String,
    binding: &'a ParamBinding,
}

impl ConfigParam<'_> {
    /// TOML key the field deserializes from
    fn key(&self) -> &str { self.field.trim_start_matches("r#") }
}

/// Path parameters across every surface, one per name and type.
///
/// A name shared by parameters of different types gets a suffixed field per
/// type so every client's `connect` call type-checks.
fn config_params<'a>(input: &'a GenerationInput<'_>) -> Vec<ConfigParam<'a>> {
    let mut names = NameResolver::new();
    let mut params: Vec<ConfigParam<'a>> = Vec::new();
    for binding in input.surfaces.iter().flat_map(|surface| surface.path_params.iter()) {
        if params.iter().any(|p| p.binding.name == binding.name && p.binding.ty == binding.ty) {
            continue;
        }
        let field = names.resolve_identifier(binding.name.trim_start_matches("r#"));
        params.push(ConfigParam { field, binding });
    }
    params
}

/// Field holding `binding` in `params`.
fn field_for<'p>(params: &'p [ConfigParam<'_>], binding: &'p ParamBinding) -> &'p str {
    params
        .iter()
        .find(|p| p.binding.name == binding.name && p.binding.ty == binding.ty)
        .map_or(binding.name.as_str(), |p| p.field.as_str())
}

/// Wire names of the config record's fields, as the TOML table spells them.
fn auth_fields(auth: &AuthScheme) -> Vec<String> {
    match auth.definition().shape {
        TypeShape::Record { fields } => fields.into_iter().map(|field| field.wire_name).collect(),
        _ => Vec::new(),
    }
}

fn test_source(input: &GenerationInput<'_>, params: &[ConfigParam<'_>]) -> Result<String> {
    let adapter = RustTypeAdapter;
    let mut code = String::new();
    writeln!(code, "//! Connection tests for the generated clients.")?;
    writeln!(code, "//!")?;
    writeln!(code, "//! Fill in `Config.toml`, then run with `cargo test -- --ignored`.\n")?;
    writeln!(code, "use serde::Deserialize;\n")?;
    writeln!(code, "use super::*;\n")?;

    writeln!(code, "#[derive(Debug, Deserialize)]")?;
    writeln!(code, "struct TestConfig {{")?;
    writeln!(code, "    service_url: String,")?;
    for param in params {
        writeln!(code, "    {}: {},", param.field, adapter.render(&param.binding.ty))?;
    }
    if let Some(auth) = input.auth {
        writeln!(code, "    auth: {},", auth.config_type())?;
    }
    writeln!(code, "}}\n")?;

    writeln!(
        code,
        "fn load_config() -> TestConfig {{\n\
         \x20   toml::from_str(include_str!(\"Config.toml\")).expect(\"Config.toml is valid\")\n\
         }}\n"
    )?;

    for surface in input.surfaces {
        let mut args = vec![match input.default_service_url {
            Some(_) => "Some(&config.service_url)".to_string(),
            None => "&config.service_url".to_string(),
        }];
        for param in &surface.path_params {
            args.push(format!("config.{}.clone()", field_for(params, param)));
        }
        if input.auth.is_some() {
            args.push("&config.auth".to_string());
        }

        for method in &surface.methods {
            writeln!(code, "#[tokio::test]")?;
            writeln!(code, "#[ignore = \"requires a running service\"]")?;
            writeln!(code, "async fn test_{}_{}() {{", naming::to_snake_case(&surface.client_name), method.name)?;
            writeln!(code, "    let config = load_config();")?;
            writeln!(
                code,
                "    let client = {}::connect({}).await.expect(\"connect\");",
                surface.client_name,
                args.join(", ")
            )?;
            writeln!(code, "    // Call `client.{}(..)` and assert on the result.", method.name)?;
            writeln!(code, "    client.close().await.expect(\"close\");")?;
            writeln!(code, "}}\n")?;
        }
    }
    Ok(code)
}

fn config(input: &GenerationInput<'_>, params: &[ConfigParam<'_>]) -> Result<String> {
    let mut text = String::new();
    writeln!(text, "service_url = {:?}", input.default_service_url.unwrap_or(""))?;
    for param in params {
        writeln!(text, "{} = {}", param.key(), placeholder(&param.binding.ty))?;
    }
    if let Some(auth) = input.auth {
        writeln!(text, "\n[auth]")?;
        for field in auth_fields(auth) {
            writeln!(text, "{} = \"\"", field)?;
        }
    }
    Ok(text)
}

fn placeholder(ty: &TypeRef) -> &'static str {
    match ty {
        TypeRef::Primitive(PrimitiveType::Int32 | PrimitiveType::Int64) => "0",
        TypeRef::Primitive(PrimitiveType::Float32 | PrimitiveType::Float64) => "0.0",
        TypeRef::Primitive(PrimitiveType::Boolean) => "false",
        TypeRef::Primitive(PrimitiveType::Bytes) => "[]",
        _ => "\"\"",
    }
}

#[cfg(test)]
mod tests {
    use ir::{ChannelSurface, ClientMethod, ReturnShape};
    use registry::TypeRegistry;

    use super::*;

    #[test]
    fn skeleton_shares_params_between_clients() {
        let param = ParamBinding {
            name: "room_id".into(),
            wire_name: "roomId".into(),
            ty: TypeRef::Primitive(PrimitiveType::Int64),
        };
        let method = ClientMethod {
            name: "do_join".into(),
            tag: "Join".into(),
            description: None,
            path_params: vec![param.clone()],
            payload: None,
            returns: ReturnShape::None,
        };
        let surfaces: Vec<ChannelSurface> = ["ChatRoomsClient", "ChatMembersClient"]
            .iter()
            .map(|name| ChannelSurface {
                path: "/rooms/{roomId}".into(),
                client_name: name.to_string(),
                description: None,
                path_params: vec![param.clone()],
                dispatcher: None,
                event_identifier: None,
                methods: vec![method.clone()],
            })
            .collect();
        let registry = TypeRegistry::new();
        let auth = AuthScheme::Bearer { scheme: "token".into() };
        let input = GenerationInput {
            registry: &registry,
            surfaces: &surfaces,
            auth: Some(&auth),
            default_service_url: Some("wss://chat.example.com"),
            include_tests: true,
        };

        let skeleton = TestSkeletonGenerator.generate_skeleton(&input).expect("skeleton");
        assert_eq!(skeleton.config, "service_url = \"wss://chat.example.com\"\nroom_id = 0\n\n[auth]\ntoken = \"\"\n");
        assert_eq!(skeleton.test_source.matches("    room_id: i64,").count(), 1);
        assert!(skeleton.test_source.contains("    auth: BearerTokenConfig,"));
        assert!(skeleton.test_source.contains(
            "ChatMembersClient::connect(Some(&config.service_url), config.room_id.clone(), &config.auth)"
        ));
        assert!(skeleton.test_source.contains("async fn test_chat_rooms_client_do_join()"));
    }

    #[test]
    fn same_name_with_different_types_gets_separate_fields() {
        let binding = |name: &str, ty: PrimitiveType| ParamBinding {
            name: name.into(),
            wire_name: name.trim_start_matches("r#").into(),
            ty: TypeRef::Primitive(ty),
        };
        let surface = |client: &str, params: Vec<ParamBinding>| ChannelSurface {
            path: "/rooms/{room_id}".into(),
            client_name: client.into(),
            description: None,
            path_params: params,
            dispatcher: None,
            event_identifier: None,
            methods: vec![ClientMethod {
                name: "do_join".into(),
                tag: "Join".into(),
                description: None,
                path_params: Vec::new(),
                payload: None,
                returns: ReturnShape::None,
            }],
        };
        let surfaces = vec![
            surface("LobbyClient", vec![binding("room_id", PrimitiveType::String), binding("r#type", PrimitiveType::String)]),
            surface("ArenaClient", vec![binding("room_id", PrimitiveType::Int64)]),
        ];
        let registry = TypeRegistry::new();
        let input = GenerationInput {
            registry: &registry,
            surfaces: &surfaces,
            auth: None,
            default_service_url: None,
            include_tests: true,
        };

        let skeleton = TestSkeletonGenerator.generate_skeleton(&input).expect("skeleton");
        assert_eq!(skeleton.config, "service_url = \"\"\nroom_id = \"\"\ntype = \"\"\nroom_id_1 = 0\n");
        assert!(skeleton.test_source.contains("    room_id: String,\n    r#type: String,\n    room_id_1: i64,\n"));
        assert!(skeleton
            .test_source
            .contains("LobbyClient::connect(&config.service_url, config.room_id.clone(), config.r#type.clone())"));
        assert!(skeleton.test_source.contains("ArenaClient::connect(&config.service_url, config.room_id_1.clone())"));
    }
}
