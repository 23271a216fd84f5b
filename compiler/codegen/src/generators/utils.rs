//! Emits the `utils` module: small helpers the client calls.
//!
//! Only the helpers the client actually uses are written; when none is
//! needed the module is empty and the pipeline skips it.

use std::fmt::Write as _;

use crate::{CodeGenerator, GenerationInput, Result, UtilsUsage, GENERATED_BANNER};

/// Generator for the `utils` module
#[derive(Debug, Default, Clone, Copy)]
pub struct UtilsGenerator;

impl CodeGenerator for UtilsGenerator {
    fn generate(&self, input: &GenerationInput<'_>) -> Result<String> {
        let usage = UtilsUsage::of(input);
        if usage.is_empty() {
            return Ok(String::new());
        }

        let mut code = String::new();
        writeln!(code, "{}", GENERATED_BANNER)?;
        writeln!(code, "//! Helpers shared by the generated clients.\n")?;
        if usage.field_paths {
            writeln!(code, "use serde_json::{{Map, Value}};\n")?;
        }
        if usage.encode {
            emit_encode_uri_component(&mut code)?;
        }
        if usage.field_paths {
            emit_field_paths(&mut code)?;
        }
        Ok(code)
    }
}

fn emit_encode_uri_component(code: &mut String) -> Result<()> {
    writeln!(
        code,
        "/// Percent-encode `value` for use inside a URL path segment or query value.\n\
         pub fn encode_uri_component(value: &str) -> String {{\n\
         \x20   let mut encoded = String::with_capacity(value.len());\n\
         \x20   for byte in value.bytes() {{\n\
         \x20       match byte {{\n\
         \x20           b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\\'' | b'(' | b')' => {{\n\
         \x20               encoded.push(char::from(byte))\n\
         \x20           }}\n\
         \x20           _ => encoded.push_str(&format!(\"%{{:02X}}\", byte)),\n\
         \x20       }}\n\
         \x20   }}\n\
         \x20   encoded\n\
         }}\n"
    )?;
    Ok(())
}

fn emit_field_paths(code: &mut String) -> Result<()> {
    writeln!(
        code,
        "/// Write `value` at the dotted `path`, creating intermediate objects.\n\
         pub fn set_by_path(target: &mut Value, path: &str, value: Value) {{\n\
         \x20   let mut current = target;\n\
         \x20   let mut segments = path.split('.').peekable();\n\
         \x20   while let Some(segment) = segments.next() {{\n\
         \x20       if !current.is_object() {{\n\
         \x20           *current = Value::Object(Map::new());\n\
         \x20       }}\n\
         \x20       let Value::Object(map) = current else {{ return }};\n\
         \x20       if segments.peek().is_none() {{\n\
         \x20           map.insert(segment.to_string(), value);\n\
         \x20           return;\n\
         \x20       }}\n\
         \x20       current = map.entry(segment.to_string()).or_insert(Value::Null);\n\
         \x20   }}\n\
         }}\n\
         \n\
         /// Read the value at the dotted `path`, if present.\n\
         pub fn get_by_path<'a>(source: &'a Value, path: &str) -> Option<&'a Value> {{\n\
         \x20   path.split('.').try_fold(source, |current, segment| current.get(segment))\n\
         }}\n\
         \n\
         /// Routing key of a dispatcher or stream id value.\n\
         pub fn route_key(value: &Value) -> String {{\n\
         \x20   match value {{\n\
         \x20       Value::String(text) => text.clone(),\n\
         \x20       other => other.to_string(),\n\
         \x20   }}\n\
         }}\n"
    )?;
    Ok(())
}
