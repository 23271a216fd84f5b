//! Emits the `client` module: the connection runtime plus one client struct
//! per channel surface.

use std::fmt::Write as _;

use ir::{
    ChannelSurface, ClientMethod, EventIdentifierKind, ParamBinding, PrimitiveType, ReturnShape,
    TypeRef,
};
use naming::{placeholders, to_snake_case};
use types::{RustTypeAdapter, TypeAdapter};

use super::doc_comment::{write_doc_comment, write_doc_line, write_method_docs};
use super::runtime::{
    emit_connection, emit_error_enum, emit_header_value, emit_imports, emit_response_stream,
};
use crate::{CodeGenerator, GenerationInput, Result, UtilsUsage, GENERATED_BANNER};

/// Generator for the `client` module
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientGenerator;

impl CodeGenerator for ClientGenerator {
    fn generate(&self, input: &GenerationInput<'_>) -> Result<String> {
        let mut code = String::new();
        writeln!(code, "{}", GENERATED_BANNER)?;
        writeln!(code, "//! Connection-oriented clients, one per channel.\n")?;

        emit_imports(&mut code, input.auth)?;
        if !input.registry.list_types().is_empty() {
            writeln!(code, "\n#[allow(unused_imports)]\nuse super::types::*;")?;
        }
        if !UtilsUsage::of(input).is_empty() {
            writeln!(code, "#[allow(unused_imports)]\nuse super::utils::*;")?;
        }
        writeln!(code)?;

        if let Some(url) = input.default_service_url {
            writeln!(code, "/// Service URL used when `connect` receives none.")?;
            writeln!(code, "pub const DEFAULT_SERVICE_URL: &str = {:?};\n", url)?;
        }

        emit_error_enum(&mut code)?;
        emit_response_stream(&mut code)?;
        emit_connection(&mut code)?;
        if input.auth.is_some_and(|auth| auth.uses_headers()) {
            emit_header_value(&mut code)?;
        }

        for surface in input.surfaces {
            emit_client(&mut code, surface, input)?;
        }

        if input.include_tests {
            writeln!(code, "#[cfg(test)]\n#[path = \"tests/test_client.rs\"]\nmod tests;")?;
        }
        tracing::debug!(clients = input.surfaces.len(), "rendered client module");
        Ok(code)
    }
}

fn emit_client(code: &mut String, surface: &ChannelSurface, input: &GenerationInput<'_>) -> Result<()> {
    match &surface.description {
        Some(description) if !description.trim().is_empty() => write_doc_comment(code, description, "")?,
        _ => write_doc_line(code, &format!("Client for the `{}` channel.", surface.path), "")?,
    }
    writeln!(code, "pub struct {} {{\n    connection: Connection,\n}}\n", surface.client_name)?;
    writeln!(code, "impl {} {{", surface.client_name)?;
    emit_connect(code, surface, input)?;
    writeln!(
        code,
        "    /// Close the connection.\n\
         \x20   pub async fn close(&self) -> Result<(), ClientError> {{ self.connection.close().await }}"
    )?;
    for method in &surface.methods {
        writeln!(code)?;
        emit_method(code, surface, method)?;
    }
    writeln!(code, "}}\n")?;
    emit_router(code, surface)?;
    Ok(())
}

fn emit_connect(code: &mut String, surface: &ChannelSurface, input: &GenerationInput<'_>) -> Result<()> {
    let mut params = Vec::new();
    params.push(match input.default_service_url {
        Some(_) => "service_url: Option<&str>".to_string(),
        None => "service_url: &str".to_string(),
    });
    for param in &surface.path_params {
        params.push(format!("{}: {}", param.name, RustTypeAdapter.render(&param.ty)));
    }
    if let Some(auth) = input.auth {
        params.push(format!("auth: &{}", auth.config_type()));
    }

    write_doc_line(code, &format!("Open a connection to the `{}` channel.", surface.path), "    ")?;
    if input.default_service_url.is_some() {
        write_doc_line(code, "", "    ")?;
        write_doc_line(code, "`service_url` defaults to `DEFAULT_SERVICE_URL`.", "    ")?;
    }
    writeln!(code, "    pub async fn connect({}) -> Result<Self, ClientError> {{", params.join(", "))?;
    if input.default_service_url.is_some() {
        writeln!(code, "        let service_url = service_url.unwrap_or(DEFAULT_SERVICE_URL);")?;
    }
    writeln!(code, "        let url = {};", url_expression(surface)?)?;

    let request_statements = input.auth.and_then(|auth| auth.request_statements());
    if let Some(statements) = input.auth.and_then(|auth| auth.url_statements()) {
        code.push_str(&statements);
    }
    if let Some(statements) = request_statements {
        writeln!(code, "        let mut request = url.into_client_request()?;")?;
        code.push_str(&statements);
    } else {
        writeln!(code, "        let request = url.into_client_request()?;")?;
    }
    writeln!(
        code,
        "        let connection = Connection::open(request, {}).await?;\n\
         \x20       Ok(Self {{ connection }})\n\
         \x20   }}\n",
        router_name(surface)
    )?;
    Ok(())
}

/// `format!` expression building the connection URL from the channel template.
fn url_expression(surface: &ChannelSurface) -> Result<String> {
    if surface.path == "/" || surface.path.is_empty() {
        return Ok("service_url.to_string()".to_string());
    }

    let mut template = String::from("{}");
    let mut args = vec!["service_url.trim_end_matches('/')".to_string()];
    let mut last = 0;
    for placeholder in placeholders(&surface.path)? {
        template.push_str(&escape_braces(&surface.path[last..placeholder.start]));
        template.push_str("{}");
        args.push(encoded_param(&surface.path_params, &placeholder.name));
        last = placeholder.end;
    }
    template.push_str(&escape_braces(&surface.path[last..]));
    Ok(format!("format!({:?}, {})", template, args.join(", ")))
}

fn escape_braces(text: &str) -> String { text.replace('{', "{{").replace('}', "}}") }

fn encoded_param(bindings: &[ParamBinding], wire: &str) -> String {
    match bindings.iter().find(|b| b.wire_name == wire) {
        Some(binding) => match binding.ty {
            TypeRef::Primitive(PrimitiveType::String) => format!("encode_uri_component(&{})", binding.name),
            TypeRef::Primitive(PrimitiveType::Bytes) => {
                format!("encode_uri_component(&String::from_utf8_lossy(&{}))", binding.name)
            }
            _ => format!("encode_uri_component(&{}.to_string())", binding.name),
        },
        None => format!("encode_uri_component(&{}.to_string())", to_snake_case(wire)),
    }
}

fn emit_method(code: &mut String, surface: &ChannelSurface, method: &ClientMethod) -> Result<()> {
    let adapter = RustTypeAdapter;
    write_method_docs(code, method, "    ")?;

    let params = match &method.payload {
        Some(payload) => format!("&self, {}: {}", payload.name, adapter.render(&payload.ty)),
        None => "&self".to_string(),
    };
    let returns = match &method.returns {
        ReturnShape::None => "()".to_string(),
        ReturnShape::Direct { ty, .. } => adapter.render(ty),
        ReturnShape::Stream { ty, .. } => adapter.stream(&adapter.render(ty)),
    };
    writeln!(code, "    pub async fn {}({}) -> Result<{}, ClientError> {{", method.name, params, returns)?;

    let dispatcher = surface.dispatcher.as_ref();
    let header_kind = surface
        .event_identifier
        .as_ref()
        .is_some_and(|id| id.kind == EventIdentifierKind::Header);
    let body_writes = dispatcher.is_some() && !header_kind;

    let binding = if body_writes { "let mut message" } else { "let message" };
    match &method.payload {
        Some(payload) => writeln!(code, "        {} = serde_json::to_value(&{})?;", binding, payload.name)?,
        None => writeln!(code, "        {} = Value::Object(Default::default());", binding)?,
    }

    let needs_key = !matches!(method.returns, ReturnShape::None)
        || dispatcher.is_some_and(|d| d.stream_id.is_some());
    if needs_key {
        let key = match dispatcher {
            Some(d) if d.stream_id.is_some() => "self.connection.next_stream_id()".to_string(),
            Some(_) => match &method.returns {
                ReturnShape::Direct { tag, .. } | ReturnShape::Stream { tag, .. } => {
                    format!("{:?}.to_string()", tag)
                }
                ReturnShape::None => "String::new()".to_string(),
            },
            None => "String::new()".to_string(),
        };
        writeln!(code, "        let key = {};", key)?;
    }

    if let Some(dispatcher) = dispatcher {
        if header_kind {
            let mut headers = format!("{:?}: {:?}", dispatcher.key, method.tag);
            if let Some(stream_id) = &dispatcher.stream_id {
                write!(headers, ", {:?}: key", stream_id)?;
            }
            writeln!(
                code,
                "        let message = serde_json::json!({{ \"headers\": {{ {} }}, \"payload\": message }});",
                headers
            )?;
        } else {
            writeln!(
                code,
                "        set_by_path(&mut message, {:?}, Value::from({:?}));",
                dispatcher.key, method.tag
            )?;
            if let Some(stream_id) = &dispatcher.stream_id {
                writeln!(code, "        set_by_path(&mut message, {:?}, Value::from(key.clone()));", stream_id)?;
            }
        }
    }

    match &method.returns {
        ReturnShape::None => writeln!(code, "        self.connection.send(&message).await")?,
        ReturnShape::Direct { .. } => writeln!(code, "        self.connection.request(&key, &message).await")?,
        ReturnShape::Stream { .. } => writeln!(code, "        self.connection.stream(&key, &message).await")?,
    }
    writeln!(code, "    }}")?;
    Ok(())
}

fn router_name(surface: &ChannelSurface) -> String { format!("route_{}", to_snake_case(&surface.client_name)) }

/// Inbound routing: which subscriber a frame belongs to, and the body it gets.
fn emit_router(code: &mut String, surface: &ChannelSurface) -> Result<()> {
    writeln!(code, "fn {}(frame: Value) -> Option<(String, Value)> {{", router_name(surface))?;
    match &surface.dispatcher {
        None => writeln!(code, "    Some((String::new(), frame))")?,
        Some(dispatcher) => {
            let field = dispatcher.stream_id.as_deref().unwrap_or(&dispatcher.key);
            let header_kind = surface
                .event_identifier
                .as_ref()
                .is_some_and(|id| id.kind == EventIdentifierKind::Header);
            if header_kind {
                writeln!(
                    code,
                    "    let key = frame.get(\"headers\").and_then(|headers| get_by_path(headers, {:?})).map(route_key)?;\n\
                     \x20   let body = frame.get(\"payload\").cloned().unwrap_or(Value::Null);\n\
                     \x20   Some((key, body))",
                    field
                )?;
            } else {
                writeln!(
                    code,
                    "    let key = get_by_path(&frame, {:?}).map(route_key)?;\n\
                     \x20   Some((key, frame))",
                    field
                )?;
            }
        }
    }
    writeln!(code, "}}\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use ir::{DispatcherConfig, EventIdentifier};

    use super::*;

    fn surface(path: &str, params: Vec<ParamBinding>) -> ChannelSurface {
        ChannelSurface {
            path: path.into(),
            client_name: "FeedClient".into(),
            description: None,
            path_params: params,
            dispatcher: None,
            event_identifier: None,
            methods: Vec::new(),
        }
    }

    fn binding(name: &str, wire: &str, ty: PrimitiveType) -> ParamBinding {
        ParamBinding { name: name.into(), wire_name: wire.into(), ty: TypeRef::Primitive(ty) }
    }

    #[test]
    fn url_expression_substitutes_encoded_params() {
        let surface = surface(
            "/rooms/{roomId}/{page}",
            vec![binding("room_id", "roomId", PrimitiveType::String), binding("page", "page", PrimitiveType::Int32)],
        );
        assert_eq!(
            url_expression(&surface).expect("template"),
            "format!(\"{}/rooms/{}/{}\", service_url.trim_end_matches('/'), \
             encode_uri_component(&room_id), encode_uri_component(&page.to_string()))"
        );
        assert_eq!(url_expression(&self::surface("/", Vec::new())).expect("template"), "service_url.to_string()");
    }

    #[test]
    fn header_dispatch_wraps_message() {
        let mut surface = surface("/feed", Vec::new());
        surface.dispatcher = Some(DispatcherConfig { key: "type".into(), stream_id: Some("id".into()) });
        surface.event_identifier =
            Some(EventIdentifier { kind: EventIdentifierKind::Header, path: "type".into() });
        let method = ClientMethod {
            name: "do_ping".into(),
            tag: "Ping".into(),
            description: None,
            path_params: Vec::new(),
            payload: None,
            returns: ReturnShape::Direct { tag: "Pong".into(), ty: TypeRef::named("Pong") },
        };

        let mut code = String::new();
        emit_method(&mut code, &surface, &method).expect("emit");
        assert!(code.contains("pub async fn do_ping(&self) -> Result<Pong, ClientError> {"));
        assert!(code.contains("let key = self.connection.next_stream_id();"));
        assert!(code.contains(
            "serde_json::json!({ \"headers\": { \"type\": \"Ping\", \"id\": key }, \"payload\": message })"
        ));

        let mut router = String::new();
        emit_router(&mut router, &surface).expect("emit");
        assert!(router.starts_with("fn route_feed_client(frame: Value)"));
        assert!(router.contains("get_by_path(headers, \"id\")"));
    }
}
