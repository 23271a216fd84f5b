//! Command execution.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use adapters::SourceFormat;
use config::{Config, SpecFormat};
use dialoguer::Confirm;
use pipeline::{ClientOptions, GenerationOutcome, OverwritePolicy, SpecOptions};

use crate::args::{ClientArgs, Command, CommonArgs, SpecArgs};
use crate::Result;

/// What a command generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Rust client modules
    Client,
    /// An AsyncAPI document
    Spec,
}

impl Target {
    fn files(self) -> &'static str {
        match self {
            Target::Client => "client",
            Target::Spec => "AsyncAPI specification",
        }
    }

    /// Heading printed above the list of written files.
    pub fn success_heading(self) -> &'static str {
        match self {
            Target::Client => "Client generated successfully. Following files were created:",
            Target::Spec => "AsyncAPI specification generated successfully. Following files were created:",
        }
    }
}

/// Warnings for the flags that have no meaning for `target`.
pub fn flag_warnings(target: Target, common: &CommonArgs) -> Vec<String> {
    let ignored: &[(&str, bool)] = match target {
        Target::Client => &[("--json", common.json)],
        Target::Spec => &[("--license", common.license.is_some()), ("--with-tests", common.with_tests)],
    };
    ignored
        .iter()
        .filter(|(_, set)| *set)
        .map(|(flag, _)| {
            format!(
                "WARNING the '{}' option is invalid for generating {} files and will be ignored.",
                flag,
                target.files()
            )
        })
        .collect()
}

/// Run `command` with `config` as the baseline for unset flags.
///
/// Prints the warnings and the success report; errors are left to the caller.
pub fn run(command: &Command, config: &Config) -> Result<GenerationOutcome> {
    let (target, outcome) = match command {
        Command::Client(args) => (Target::Client, run_client(args, config)?),
        Command::Spec(args) => (Target::Spec, run_spec(args, config)?),
    };
    for warning in &outcome.warnings {
        eprintln!("{}", warning);
    }
    println!("{}", target.success_heading());
    for path in &outcome.report.written {
        println!("  {}", path.display());
    }
    for path in &outcome.report.skipped {
        println!("  {} (kept existing file)", path.display());
    }
    Ok(outcome)
}

fn run_client(args: &ClientArgs, config: &Config) -> Result<GenerationOutcome> {
    let flagged = flag_warnings(Target::Client, &args.common);
    let options = client_options(args, config);
    tracing::debug!(?options, "generating client");

    let mut policy = overwrite_policy(args.force);
    let mut outcome = pipeline::generate_client(&options, &mut policy)?;
    outcome.warnings.splice(0..0, flagged);
    Ok(outcome)
}

fn run_spec(args: &SpecArgs, config: &Config) -> Result<GenerationOutcome> {
    let flagged = flag_warnings(Target::Spec, &args.common);
    let options = spec_options(args, config);
    tracing::debug!(?options, "generating specification");

    let mut outcome = pipeline::generate_spec(&options)?;
    outcome.warnings.splice(0..0, flagged);
    Ok(outcome)
}

fn output_dir(common: &CommonArgs, config: &Config) -> PathBuf {
    common.output.clone().unwrap_or_else(|| config.generator.output_dir.clone())
}

/// Merge client flags over the configuration file.
pub fn client_options(args: &ClientArgs, config: &Config) -> ClientOptions {
    ClientOptions {
        spec_path: args.spec.clone(),
        output_dir: output_dir(&args.common, config),
        license_path: args.common.license.clone().or_else(|| config.generator.license.clone()),
        include_tests: args.common.with_tests || config.generator.include_tests,
        server_url: args.server_url.clone().or_else(|| config.client.server_url.clone()),
        auth_scheme: args.auth_scheme.clone().or_else(|| config.client.auth_scheme.clone()),
    }
}

/// Merge spec flags over the configuration file.
pub fn spec_options(args: &SpecArgs, config: &Config) -> SpecOptions {
    let format = if args.common.json {
        SourceFormat::Json
    } else {
        match config.generator.spec_format {
            SpecFormat::Json => SourceFormat::Json,
            SpecFormat::Yaml => SourceFormat::Yaml,
        }
    };
    SpecOptions { service_path: args.service.clone(), output_dir: output_dir(&args.common, config), format }
}

/// `--force` replaces files outright. Otherwise an interactive terminal is
/// asked per file, and anything else keeps existing files.
fn overwrite_policy(force: bool) -> OverwritePolicy<'static> {
    if force {
        OverwritePolicy::AlwaysOverwrite
    } else if std::io::stdin().is_terminal() {
        OverwritePolicy::AskCaller(Box::new(confirm_overwrite))
    } else {
        OverwritePolicy::NeverOverwrite
    }
}

fn confirm_overwrite(path: &Path) -> bool {
    Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite it?", path.display()))
        .default(false)
        .interact()
        .unwrap_or_else(|error| {
            tracing::warn!(%error, "failed to read confirmation; keeping existing file");
            false
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_args(argv: &[&str]) -> ClientArgs {
        use clap::Parser;
        let mut full = vec!["asyncgen", "client", "chat.yaml"];
        full.extend_from_slice(argv);
        match crate::Cli::try_parse_from(full).expect("parse").command {
            Command::Client(args) => args,
            Command::Spec(_) => panic!("expected client"),
        }
    }

    #[test]
    fn flags_override_the_configuration_file() {
        let mut config = Config::default();
        config.generator.output_dir = PathBuf::from("from-config");
        config.generator.include_tests = true;
        config.client.server_url = Some("ws://config".to_string());
        config.client.auth_scheme = Some("token".to_string());

        let options = client_options(&client_args(&["-o", "from-flag", "--server-url", "ws://flag"]), &config);
        assert_eq!(options.output_dir, PathBuf::from("from-flag"));
        assert_eq!(options.server_url.as_deref(), Some("ws://flag"));
        assert_eq!(options.auth_scheme.as_deref(), Some("token"));
        assert!(options.include_tests);
    }

    #[test]
    fn json_flag_and_config_pick_the_spec_format() {
        let args = SpecArgs { service: PathBuf::from("svc.yaml"), common: CommonArgs::default() };
        let mut config = Config::default();
        assert_eq!(spec_options(&args, &config).format, SourceFormat::Yaml);
        config.generator.spec_format = SpecFormat::Json;
        assert_eq!(spec_options(&args, &config).format, SourceFormat::Json);

        let json = SpecArgs { common: CommonArgs { json: true, ..CommonArgs::default() }, ..args };
        assert_eq!(spec_options(&json, &Config::default()).format, SourceFormat::Json);
    }

    #[test]
    fn inapplicable_flags_are_reported() {
        let common = CommonArgs {
            output: None,
            license: Some(PathBuf::from("LICENSE")),
            with_tests: true,
            json: true,
        };
        assert_eq!(
            flag_warnings(Target::Client, &common),
            vec!["WARNING the '--json' option is invalid for generating client files and will be ignored."]
        );
        assert_eq!(
            flag_warnings(Target::Spec, &common),
            vec![
                "WARNING the '--license' option is invalid for generating AsyncAPI specification files and will be ignored.",
                "WARNING the '--with-tests' option is invalid for generating AsyncAPI specification files and will be ignored.",
            ]
        );
        assert!(flag_warnings(Target::Spec, &CommonArgs::default()).is_empty());
    }
}
