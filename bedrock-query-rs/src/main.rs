//! bedrock-query CLI entry point.

use bedrock_query::cli::args::{Cli, Commands};
use bedrock_query::cli::output::Output;
use bedrock_query::cli::{inspect, search};
use bedrock_query::config::Config;
use bedrock_query::error::{Error, exit_code};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = Config::load(cli.config.as_deref())?;
    let output = Output::new(cli.output_format(), cli.quiet);

    match &cli.command {
        Commands::Search(args) => search::run(&config, args, &output),
        Commands::Parse(args) => inspect::parse(args, &output),
        Commands::Explain(args) => inspect::explain(&config, args, &output),
        Commands::Screens => inspect::screens(&config, &output),
        Commands::Classify(args) => inspect::classify(args, &output),
    }
}
