use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_WORKFLOW_FILE: &str = "commands.yaml";

#[derive(Args)]
pub struct RunArgs {
    /// Workflow document with commands, descriptions, and configuration
    /// blocks in YAML format (default: commands.yaml)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_WORKFLOW_FILE)]
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Host to bind the REST API to (default: localhost)
    #[arg(long, default_value = "localhost", value_name = "HOST")]
    pub host: String,

    /// HTTP port for the REST API (default: 8080)
    #[arg(long, default_value = "8080", value_name = "PORT")]
    pub port: u16,

    /// Disable bearer-token authentication; the token is otherwise read
    /// from RUNBOOK_API_TOKEN
    #[arg(long)]
    pub no_auth: bool,
}

#[derive(Args)]
pub struct RecordArgs {
    /// Shell type recorded into the generated document
    #[arg(long, default_value = "bash", value_name = "SHELL")]
    pub shell_type: String,

    /// Write the generated document here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Natural-language description of the workflow to generate
    #[arg(long, value_name = "TEXT")]
    pub prompt: String,

    /// OpenAI API key; falls back to OPENAI_API_KEY, then to the
    /// deterministic pattern-matching generator
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Model used for generation
    #[arg(long, default_value = "gpt-4o-mini", value_name = "MODEL")]
    pub model: String,

    /// Execute the generated document immediately instead of printing it
    #[arg(long)]
    pub execute: bool,
}

#[derive(Args)]
pub struct ToolsArgs {}
