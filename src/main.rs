//! JBI CLI entry point.

use clap::Parser;

use jbi::cli::commands::{classify, steps, validate};
use jbi::cli::{handle_error, load_settings, Cli, Commands};
use jbi::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => handle_error(err, cli.json),
    };
    let _logger = match LoggerImpl::init(&settings.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Validate(args) => validate::execute(args, &settings, cli.json),
        Commands::Steps(args) => steps::execute(args, cli.json),
        Commands::Classify(args) => classify::execute(args, &settings, cli.json),
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
