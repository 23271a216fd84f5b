//! Configuration of one client generation run.

use std::path::PathBuf;

use ir::SpecDocument;

use crate::PipelineError;

/// Everything a client generation run needs
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The normalized specification document
    pub document: SpecDocument,
    /// Directory the artifacts are written to
    pub output_dir: PathBuf,
    /// License text prepended to every Rust artifact
    pub license: Option<String>,
    /// Whether the test skeleton is emitted
    pub include_tests: bool,
    /// Service URL overriding the document's first server
    pub server_url: Option<String>,
    /// Preferred key under `securitySchemes`
    pub auth_scheme: Option<String>,
}

impl ClientConfig {
    /// Create a new builder for ClientConfig
    pub fn builder() -> ClientConfigBuilder { ClientConfigBuilder::default() }

    /// URL the generated client falls back to, if any
    pub fn default_service_url(&self) -> Option<&str> {
        self.server_url
            .as_deref()
            .or_else(|| self.document.servers.first().map(|server| server.url.as_str()))
            .filter(|url| !url.trim().is_empty())
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    document: Option<SpecDocument>,
    output_dir: Option<PathBuf>,
    license: Option<String>,
    include_tests: bool,
    server_url: Option<String>,
    auth_scheme: Option<String>,
}

impl ClientConfigBuilder {
    /// Set the normalized document
    pub fn document(mut self, document: SpecDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the license text
    pub fn license(mut self, license: Option<String>) -> Self {
        self.license = license;
        self
    }

    /// Emit the test skeleton
    pub fn include_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    /// Override the service URL
    pub fn server_url(mut self, url: Option<String>) -> Self {
        self.server_url = url;
        self
    }

    /// Prefer an authentication scheme
    pub fn auth_scheme(mut self, scheme: Option<String>) -> Self {
        self.auth_scheme = scheme;
        self
    }

    /// Build the ClientConfig
    pub fn build(self) -> Result<ClientConfig, PipelineError> {
        Ok(ClientConfig {
            document: self
                .document
                .ok_or_else(|| PipelineError::Message("document is required".to_string()))?,
            output_dir: self
                .output_dir
                .ok_or_else(|| PipelineError::Message("output_dir is required".to_string()))?,
            license: self.license,
            include_tests: self.include_tests,
            server_url: self.server_url,
            auth_scheme: self.auth_scheme,
        })
    }
}

#[cfg(test)]
mod tests {
    use ir::{Info, Server};

    use super::*;

    fn document(servers: Vec<Server>) -> SpecDocument {
        SpecDocument {
            asyncapi: "2.6.0".into(),
            info: Info { title: "chat".into(), version: "1.0.0".into(), description: None },
            servers,
            channels: Vec::new(),
            components: Default::default(),
        }
    }

    #[test]
    fn missing_output_dir_is_reported() {
        let error = ClientConfig::builder().document(document(Vec::new())).build().expect_err("no dir");
        assert_eq!(error.to_string(), "output_dir is required");
    }

    #[test]
    fn server_override_wins() {
        let server = Server {
            name: "prod".into(),
            url: "wss://a.example.com".into(),
            protocol: "wss".into(),
            security: Vec::new(),
        };
        let config = ClientConfig::builder()
            .document(document(vec![server]))
            .output_dir("out")
            .build()
            .expect("config");
        assert_eq!(config.default_service_url(), Some("wss://a.example.com"));

        let config = ClientConfig { server_url: Some("ws://localhost:9090".into()), ..config };
        assert_eq!(config.default_service_url(), Some("ws://localhost:9090"));
    }
}
