//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Clausegraph - extract grounded clauses and their relationships from legal documents.
#[derive(Debug, Parser)]
#[command(name = "clausegraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Additional document type definitions (TOML)
    #[arg(long = "schema", global = true)]
    pub schemas: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract clauses from a document
    Extract(ExtractArgs),

    /// List registered document types
    Schemas(SchemasArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document type (e.g. rental, loan, terms_of_service)
    #[arg(short = 't', long)]
    pub document_type: String,

    /// Plain-text document to read ("-" for stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Indent the JSON result
    #[arg(long)]
    pub pretty: bool,

    /// Ollama endpoint
    #[arg(long, env = "CLAUSEGRAPH_OLLAMA_URL")]
    pub endpoint: Option<String>,

    /// Model name
    #[arg(short, long, env = "CLAUSEGRAPH_MODEL")]
    pub model: Option<String>,
}

/// Arguments for the schemas command.
#[derive(Debug, Parser)]
pub struct SchemasArgs {
    /// Show categories and relations of one document type
    pub document_type: Option<String>,
}
