//! Pipeline orchestration for the main entry points.
//!
//! `generate_client` runs document → types → surfaces → artifacts → disk.
//! `generate_spec` runs service declaration → channels → document → disk.

use std::fs;
use std::path::PathBuf;

use adapters::{AsyncApiAdapter, SourceFormat, SpecAdapter};
use analysis::build_types;
use codegen::{select_auth, GenerationInput};
use naming::{resolve_file_name, to_snake_case};
use registry::TypeRegistryReader;
use semantics::{derive_document, derive_surfaces};

use crate::artifacts::GeneratedArtifact;
use crate::assembler::assemble;
use crate::client_config::ClientConfig;
use crate::writer::{file_names, write_artifacts, OverwritePolicy, WriteReport};
use crate::Result;

/// Inputs of a client generation run
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// AsyncAPI document to read
    pub spec_path: PathBuf,
    /// Directory the client modules are written to
    pub output_dir: PathBuf,
    /// File whose text heads every Rust artifact
    pub license_path: Option<PathBuf>,
    /// Emit the test skeleton
    pub include_tests: bool,
    /// Service URL overriding the document's servers
    pub server_url: Option<String>,
    /// Preferred security scheme
    pub auth_scheme: Option<String>,
}

/// Inputs of a specification generation run
#[derive(Debug, Clone)]
pub struct SpecOptions {
    /// Service declaration to read
    pub service_path: PathBuf,
    /// Directory the document is written to
    pub output_dir: PathBuf,
    /// Output serialization
    pub format: SourceFormat,
}

/// Result of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Files written and skipped
    pub report: WriteReport,
    /// Non-fatal problems noticed along the way
    pub warnings: Vec<String>,
}

/// Generate the client modules for the document at `options.spec_path`.
pub fn generate_client(options: &ClientOptions, policy: &mut OverwritePolicy<'_>) -> Result<GenerationOutcome> {
    let document = AsyncApiAdapter.load(&options.spec_path)?;
    tracing::info!(path = %options.spec_path.display(), channels = document.channels.len(), "loaded specification");

    let license = options.license_path.as_ref().map(fs::read_to_string).transpose()?;
    let config = ClientConfig::builder()
        .document(document)
        .output_dir(options.output_dir.clone())
        .license(license)
        .include_tests(options.include_tests)
        .server_url(options.server_url.clone())
        .auth_scheme(options.auth_scheme.clone())
        .build()?;

    let (artifacts, warnings) = compile_client(&config)?;
    let report = write_artifacts(&config.output_dir, &artifacts, policy)?;
    Ok(GenerationOutcome { report, warnings })
}

/// Render every artifact of a client run without touching the file system.
///
/// Returns the artifacts in write order together with the warnings raised
/// while selecting an authentication scheme.
pub fn compile_client(config: &ClientConfig) -> Result<(Vec<GeneratedArtifact>, Vec<String>)> {
    let selection = select_auth(&config.document.components.security_schemes, config.auth_scheme.as_deref());
    for warning in &selection.warnings {
        tracing::debug!(%warning, "auth selection");
    }
    let pre_existing = selection.scheme.iter().map(|scheme| scheme.definition()).collect();

    let model = build_types(config.document.clone(), pre_existing)?;
    let surfaces = derive_surfaces(&model.document, &model.registry)?;
    tracing::info!(
        types = model.registry.type_count(),
        clients = surfaces.len(),
        methods = surfaces.iter().map(|s| s.methods.len()).sum::<usize>(),
        "derived client surfaces"
    );

    let input = GenerationInput {
        registry: &model.registry,
        surfaces: &surfaces,
        auth: selection.scheme.as_ref(),
        default_service_url: config.default_service_url(),
        include_tests: config.include_tests,
    };
    let artifacts = assemble(config, &input)?;
    Ok((artifacts, selection.warnings))
}

/// Generate an AsyncAPI document from the service declaration at
/// `options.service_path`.
///
/// The document is named `<snake service name>_asyncapi.<ext>`; an existing
/// file of that name is never replaced.
pub fn generate_spec(options: &SpecOptions) -> Result<GenerationOutcome> {
    let service = adapters::load_service(&options.service_path)?;
    let document = derive_document(&service)?;
    let text = adapters::format::render(&document.to_value(), options.format)?;

    fs::create_dir_all(&options.output_dir)?;
    let existing = file_names(&options.output_dir)?;
    let stem = format!("{}_asyncapi", to_snake_case(&service.name));
    let path = options.output_dir.join(resolve_file_name(&stem, options.format.extension(), &existing));
    fs::write(&path, text)?;
    tracing::info!(path = %path.display(), channels = document.channels.len(), "wrote specification");

    Ok(GenerationOutcome {
        report: WriteReport { written: vec![path], skipped: Vec::new() },
        warnings: Vec::new(),
    })
}
