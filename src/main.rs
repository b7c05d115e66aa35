//! a11ycheck CLI entry point.

use a11ycheck::cli::{self, Cli, Commands, EXIT_ERROR};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => cli::run_serve(&args).await,
        Commands::Analyze(args) => cli::run_analyze(&args).await,
        Commands::Init(args) => cli::run_init(&args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
