use std::process::ExitCode;

use clap::Parser;
use modelgrant_cli::{CliArgs, ModelgrantCli};
use modelgrant_resource::Diagnostic;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let result = match ModelgrantCli::from_args("modelgrant", &args) {
        Ok(app) => app.run(args).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let diagnostic = Diagnostic::from(&e);
            eprintln!("Error: {}", diagnostic.summary);
            if let Some(detail) = &diagnostic.detail {
                eprintln!("  {detail}");
            }
            ExitCode::FAILURE
        }
    }
}
