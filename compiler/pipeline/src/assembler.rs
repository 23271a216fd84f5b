//! Artifact assembly for a client run.
//!
//! The client module is always present. Types and utils only appear when they
//! have content, and the test pair only when tests were requested. Rust
//! artifacts get the license header; the TOML config does not.

use codegen::GenerationInput;

use crate::artifacts::{client_modules, GeneratedArtifact};
use crate::client_config::ClientConfig;
use crate::Result;

/// Render and order every artifact of a client run.
pub fn assemble(config: &ClientConfig, input: &GenerationInput<'_>) -> Result<Vec<GeneratedArtifact>> {
    let header = config.license.as_deref().map(license_header).filter(|h| !h.is_empty());

    let mut artifacts = Vec::new();
    for module in client_modules() {
        let produced = module.generate_artifacts(input)?;
        tracing::debug!(module = module.module_name(), files = produced.len(), "assembled module");
        artifacts.extend(produced);
    }

    if let Some(header) = header {
        for artifact in artifacts.iter_mut().filter(|a| a.is_rust()) {
            artifact.content = format!("{}\n{}", header, artifact.content);
        }
    }
    Ok(artifacts)
}

/// License text as a block of line comments.
///
/// Text that is already commented is kept verbatim.
pub fn license_header(text: &str) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    if lines.iter().all(|line| line.trim().is_empty() || line.trim_start().starts_with("//")) {
        return lines.iter().map(|line| format!("{}\n", line.trim_end())).collect();
    }
    lines
        .iter()
        .map(|line| match line.trim_end() {
            "" => "//\n".to_string(),
            text => format!("// {}\n", text),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_license_text_is_commented() {
        assert_eq!(license_header("MIT License\n\nCopyright 2024\n"), "// MIT License\n//\n// Copyright 2024\n");
        assert_eq!(license_header("// SPDX-License-Identifier: MIT\n"), "// SPDX-License-Identifier: MIT\n");
        assert_eq!(license_header("  \n"), "");
    }
}
