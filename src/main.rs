use clap::Parser;
use runbook::core::{AppError, DefaultErrorReporter, ErrorReporter};

#[tokio::main]
async fn main() {
    let args = runbook::cli::Args::parse();
    if let Err(err) = runbook::logging::init(args.debug) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
    if let Err(err) = runbook::cli::run(args).await {
        // Structured errors carry their context and hints; everything else
        // prints as a plain chain.
        match err.downcast::<AppError>() {
            Ok(app_err) => DefaultErrorReporter::new().report_error(&app_err),
            Err(other) => eprintln!("[ERROR] {:#}", other),
        }
        std::process::exit(1);
    }
}
