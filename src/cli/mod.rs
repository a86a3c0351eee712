pub mod args;
pub mod commands;

pub use args::{GenerateArgs, RecordArgs, RunArgs, ServeArgs, ToolsArgs};
use clap::{Parser, Subcommand};

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
WORKFLOW COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "runbook")]
#[command(version = crate::VERSION)]
#[command(about = "Declarative workflow runner for ordered infrastructure operations")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: describe operations in a YAML document, run it locally, then expose the same runner over HTTP or the tool server when automation needs it."
)]
pub struct Args {
    /// Activate debug mode to print more information
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Execute a workflow document",
        long_about = "Run parses and validates the document, then executes every operation strictly in document order, reporting to the configured output sink.",
        after_help = "Example:\n    runbook run -f deploy.yaml"
    )]
    Run(RunArgs),
    #[command(
        about = "Serve workflow execution over HTTP",
        long_about = "Serve accepts YAML documents via POST and returns each run's records in the HTTP response; output is forced to the rest sink. Requests carry a bearer token from RUNBOOK_API_TOKEN unless --no-auth is set.",
        after_help = "Example:\n    runbook serve --host 0.0.0.0 --port 8080 --no-auth"
    )]
    Serve(ServeArgs),
    #[command(
        about = "Record an interactive session into a document",
        long_about = "Record reads commands typed at a prompt until 'exit' and emits a runnable workflow document of shell operations.",
        after_help = "Example:\n    runbook record -o recorded.yaml"
    )]
    Record(RecordArgs),
    #[command(
        about = "Generate a workflow document from a description",
        long_about = "Generate produces a document from a natural-language description, via an AI backend when an API key is available and a pattern-matching fallback otherwise.",
        after_help = "Example:\n    runbook generate --prompt \"set up postgres with docker compose\""
    )]
    Generate(GenerateArgs),
    #[command(
        about = "Serve workflow tools over stdio JSON-RPC",
        long_about = "Tools exposes execute, generate, and validate operations to JSON-RPC clients over stdin/stdout.",
        after_help = "Example:\n    runbook tools"
    )]
    Tools(ToolsArgs),
}

pub async fn run(args: Args) -> crate::Result<()> {
    let debug = args.debug;
    match args.command {
        Command::Run(run_args) => commands::run(run_args, debug).await,
        Command::Serve(serve_args) => commands::serve(serve_args).await,
        Command::Record(record_args) => commands::record(record_args).await,
        Command::Generate(generate_args) => commands::generate(generate_args, debug).await,
        Command::Tools(tools_args) => commands::tools(tools_args).await,
    }
}
