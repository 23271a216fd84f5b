//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Bidirectional AsyncAPI code generator
#[derive(Debug, Parser)]
#[command(name = "asyncgen", version, about = "Generate Rust WebSocket clients from AsyncAPI documents, and AsyncAPI documents from service declarations")]
pub struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Generation direction
    #[command(subcommand)]
    pub command: Command,
}

/// Generation direction.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a Rust client from an AsyncAPI document
    Client(ClientArgs),
    /// Generate an AsyncAPI document from a service declaration
    Spec(SpecArgs),
}

/// Flags shared by both directions.
///
/// Not every flag applies to both; the ones that do not are reported and
/// ignored.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Directory the generated files are written to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// License file prepended to every generated Rust source
    #[arg(long, value_name = "FILE")]
    pub license: Option<PathBuf>,

    /// Also emit a test skeleton and its configuration
    #[arg(long)]
    pub with_tests: bool,

    /// Write JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

/// `asyncgen client`
#[derive(Debug, Clone, Args)]
pub struct ClientArgs {
    /// AsyncAPI document (JSON or YAML)
    pub spec: PathBuf,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub common: CommonArgs,

    /// Service URL baked into the client instead of the document's first server
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Security scheme to authenticate with
    #[arg(long, value_name = "NAME")]
    pub auth_scheme: Option<String>,

    /// Replace existing client sources without asking
    #[arg(short, long)]
    pub force: bool,
}

/// `asyncgen spec`
#[derive(Debug, Clone, Args)]
pub struct SpecArgs {
    /// Service declaration (JSON or YAML)
    pub service: PathBuf,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub common: CommonArgs,
}
