use crate::{
    cli::args::{GenerateArgs, RecordArgs, RunArgs, ServeArgs, ToolsArgs},
    core,
    generator::WorkflowGenerator,
    mcp, recorder, restapi, Result,
};
use anyhow::Context;
use std::fs;

/// Execute a workflow document from a file.
pub async fn run(args: RunArgs, debug: bool) -> Result<()> {
    let input = fs::read(&args.file)
        .with_context(|| format!("failed to read workflow file {}", args.file.display()))?;
    core::execute(&input, debug)
        .await
        .map_err(anyhow::Error::from)
}

/// Start the REST API server.
pub async fn serve(args: ServeArgs) -> Result<()> {
    let token = std::env::var("RUNBOOK_API_TOKEN").ok();
    if !args.no_auth && token.as_deref().map_or(true, |t| t.trim().is_empty()) {
        anyhow::bail!(
            "authentication is enabled but RUNBOOK_API_TOKEN is not set; pass --no-auth to disable"
        );
    }
    let config = restapi::ServerConfig {
        host: args.host,
        port: args.port,
        auth_token: if args.no_auth { None } else { token },
    };
    restapi::serve(config).await.map_err(anyhow::Error::from)
}

/// Record an interactive session into a workflow document.
pub async fn record(args: RecordArgs) -> Result<()> {
    let stdin = std::io::stdin();
    let commands = recorder::read_commands(&mut stdin.lock())?;
    let document = recorder::to_document(&commands, &args.shell_type);
    let rendered = serde_yaml::to_string(&document).context("failed to render document")?;
    match args.output {
        Some(path) => {
            fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("recorded {} commands to {}", commands.len(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Generate a document from a description, optionally executing it.
pub async fn generate(args: GenerateArgs, debug: bool) -> Result<()> {
    let api_key = args
        .api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok());
    let generator = WorkflowGenerator::new(api_key, args.model);
    let document = generator.generate(&args.prompt).await?;
    let rendered = serde_yaml::to_string(&document).context("failed to render document")?;
    if args.execute {
        core::execute(rendered.as_bytes(), debug)
            .await
            .map_err(anyhow::Error::from)
    } else {
        print!("{}", rendered);
        Ok(())
    }
}

/// Serve workflow tools over stdio JSON-RPC.
pub async fn tools(_args: ToolsArgs) -> Result<()> {
    mcp::serve_stdio().await
}
