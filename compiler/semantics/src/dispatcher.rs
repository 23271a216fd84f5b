//! Dispatcher extraction from service annotations.
//!
//! ```text
//! @websocket:ServiceConfig { dispatcherKey: "event", dispatcherStreamId: "id" }
//! ```

use ir::{DispatcherConfig, ServiceDefinition};
use thiserror::Error;

/// Annotation namespace carrying service configuration
pub const ANNOTATION_NAMESPACE: &str = "websocket";
/// Annotation kind carrying service configuration
pub const SERVICE_CONFIG_KIND: &str = "ServiceConfig";
/// Field naming the dispatcher key
pub const DISPATCHER_KEY_FIELD: &str = "dispatcherKey";
/// Field naming the stream correlation key
pub const DISPATCHER_STREAM_ID_FIELD: &str = "dispatcherStreamId";

/// Why no dispatcher key could be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatcherConfigError {
    /// The service has no annotations at all
    #[error("no annotation is present on service '{service}'; add @websocket:ServiceConfig with a dispatcherKey")]
    NoAnnotation {
        /// Service name
        service: String,
    },
    /// None of the annotations is `websocket:ServiceConfig`
    #[error("@websocket:ServiceConfig annotation is not present on service '{service}'")]
    NoServiceConfig {
        /// Service name
        service: String,
    },
    /// The annotation has no `dispatcherKey` field
    #[error("dispatcherKey field is not present in the @websocket:ServiceConfig annotation of service '{service}'")]
    NoDispatcherKey {
        /// Service name
        service: String,
    },
    /// The `dispatcherKey` value is empty after quote stripping
    #[error("dispatcherKey value cannot be empty in the @websocket:ServiceConfig annotation of service '{service}'")]
    EmptyDispatcherKey {
        /// Service name
        service: String,
    },
}

/// Read the dispatcher configuration of a service.
pub fn extract_dispatcher(service: &ServiceDefinition) -> Result<DispatcherConfig, DispatcherConfigError> {
    let name = || service.name.clone();
    if service.annotations.is_empty() {
        return Err(DispatcherConfigError::NoAnnotation { service: name() });
    }

    let annotation = service
        .annotations
        .iter()
        .find(|a| a.namespace == ANNOTATION_NAMESPACE && a.kind == SERVICE_CONFIG_KIND)
        .ok_or_else(|| DispatcherConfigError::NoServiceConfig { service: name() })?;

    let raw = annotation
        .field(DISPATCHER_KEY_FIELD)
        .ok_or_else(|| DispatcherConfigError::NoDispatcherKey { service: name() })?;
    let key = strip_quotes(raw);
    if key.is_empty() {
        return Err(DispatcherConfigError::EmptyDispatcherKey { service: name() });
    }

    let stream_id =
        annotation.field(DISPATCHER_STREAM_ID_FIELD).map(strip_quotes).filter(|s| !s.is_empty());

    Ok(DispatcherConfig { key, stream_id })
}

fn strip_quotes(raw: &str) -> String { raw.replace('"', "").trim().to_string() }

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ir::Annotation;

    use super::*;

    fn service(annotations: Vec<Annotation>) -> ServiceDefinition {
        ServiceDefinition {
            name: "chat".into(),
            description: None,
            base_path: Vec::new(),
            annotations,
            methods: Vec::new(),
            types: BTreeMap::new(),
        }
    }

    fn annotation(namespace: &str, kind: &str, fields: &[(&str, &str)]) -> Annotation {
        Annotation {
            namespace: namespace.into(),
            kind: kind.into(),
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn reads_key_and_stream_id() {
        let svc = service(vec![annotation(
            "websocket",
            "ServiceConfig",
            &[("dispatcherKey", "\"event\""), ("dispatcherStreamId", "\"id\"")],
        )]);
        let config = extract_dispatcher(&svc).expect("dispatcher");
        assert_eq!(config, DispatcherConfig { key: "event".into(), stream_id: Some("id".into()) });
    }

    #[test]
    fn each_failure_is_distinct() {
        assert_eq!(
            extract_dispatcher(&service(Vec::new())),
            Err(DispatcherConfigError::NoAnnotation { service: "chat".into() })
        );
        assert_eq!(
            extract_dispatcher(&service(vec![annotation("http", "ServiceConfig", &[])])),
            Err(DispatcherConfigError::NoServiceConfig { service: "chat".into() })
        );
        assert_eq!(
            extract_dispatcher(&service(vec![annotation("websocket", "ServiceConfig", &[])])),
            Err(DispatcherConfigError::NoDispatcherKey { service: "chat".into() })
        );
        assert_eq!(
            extract_dispatcher(&service(vec![annotation(
                "websocket",
                "ServiceConfig",
                &[("dispatcherKey", "\"\"")]
            )])),
            Err(DispatcherConfigError::EmptyDispatcherKey { service: "chat".into() })
        );
    }
}
