//! Generated files and the generators that produce them.

use std::path::{Path, PathBuf};

use codegen::{
    ClientGenerator, CodeGenerator, GenerationInput, TestSkeletonGenerator, TypesGenerator,
    UtilsGenerator,
};

use crate::Result;

/// Directory, relative to the output root, that holds test artifacts.
pub const TESTS_DIR: &str = "tests";

/// Whether an artifact may replace an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Regenerated on every run
    Overwrite,
    /// Created only when absent; the file belongs to the user afterwards
    WriteOnce,
}

/// Where an artifact lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactLocation {
    /// The output directory itself
    Root,
    /// The nested `tests` directory
    Tests,
}

/// One file produced by a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// File name, including its extension
    pub name: String,
    /// Directory the file belongs in
    pub location: ArtifactLocation,
    /// Full file contents
    pub content: String,
    /// Overwrite behavior
    pub mode: WriteMode,
}

impl GeneratedArtifact {
    /// An artifact regenerated on every run.
    pub fn overwrite(name: impl Into<String>, location: ArtifactLocation, content: String) -> Self {
        Self { name: name.into(), location, content, mode: WriteMode::Overwrite }
    }

    /// An artifact created only when absent.
    pub fn write_once(name: impl Into<String>, location: ArtifactLocation, content: String) -> Self {
        Self { name: name.into(), location, content, mode: WriteMode::WriteOnce }
    }

    /// Directory of the artifact below `root`
    pub fn directory(&self, root: &Path) -> PathBuf {
        match self.location {
            ArtifactLocation::Root => root.to_path_buf(),
            ArtifactLocation::Tests => root.join(TESTS_DIR),
        }
    }

    /// Whether the artifact is Rust source
    pub fn is_rust(&self) -> bool { self.name.ends_with(".rs") }
}

/// Trait for producing the artifacts of one module
pub trait ArtifactGenerator {
    /// Name of the module, used in logs
    fn module_name(&self) -> &str;

    /// Render the module's artifacts; an empty list means nothing to write.
    fn generate_artifacts(&self, input: &GenerationInput<'_>) -> Result<Vec<GeneratedArtifact>>;
}

/// Single-file module backed by a [`CodeGenerator`].
pub struct SourceModule<G> {
    name: &'static str,
    generator: G,
}

impl<G: CodeGenerator> SourceModule<G> {
    /// Wrap `generator`, writing its output as `<name>.rs`.
    pub fn new(name: &'static str, generator: G) -> Self { Self { name, generator } }
}

impl<G: CodeGenerator> ArtifactGenerator for SourceModule<G> {
    fn module_name(&self) -> &str { self.name }

    fn generate_artifacts(&self, input: &GenerationInput<'_>) -> Result<Vec<GeneratedArtifact>> {
        let content = codegen::clean_generated_source(&self.generator.generate(input)?);
        if content.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![GeneratedArtifact::overwrite(format!("{}.rs", self.name), ArtifactLocation::Root, content)])
    }
}

/// The test module and its config file, both write-once.
pub struct TestArtifacts;

impl ArtifactGenerator for TestArtifacts {
    fn module_name(&self) -> &str { "tests" }

    fn generate_artifacts(&self, input: &GenerationInput<'_>) -> Result<Vec<GeneratedArtifact>> {
        if !input.include_tests {
            return Ok(Vec::new());
        }
        let skeleton = TestSkeletonGenerator.generate_skeleton(input)?;
        Ok(vec![
            GeneratedArtifact::write_once(
                "test_client.rs",
                ArtifactLocation::Tests,
                codegen::clean_generated_source(&skeleton.test_source),
            ),
            GeneratedArtifact::write_once("Config.toml", ArtifactLocation::Tests, skeleton.config),
        ])
    }
}

/// Every module of a client run, in emission order.
pub fn client_modules() -> Vec<Box<dyn ArtifactGenerator>> {
    vec![
        Box::new(SourceModule::new("client", ClientGenerator)),
        Box::new(SourceModule::new("types", TypesGenerator)),
        Box::new(SourceModule::new("utils", UtilsGenerator)),
        Box::new(TestArtifacts),
    ]
}
