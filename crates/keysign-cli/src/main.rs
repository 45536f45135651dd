//! keysign: generate a key pair, sign a file, write signature and keys

mod commands;
mod error;
mod logging;

use std::{path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use error::CliResult;
use keysign_service::SignerConfig;

#[derive(Parser)]
#[command(name = "keysign")]
#[command(about = "Generate a fresh key pair, sign a file with it and write the signature and keys")]
#[command(version)]
struct Cli {
    /// YAML configuration file (key sizes, digests, encoding, write policy)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a file with a freshly generated key pair
    Sign(commands::sign::SignArgs),

    /// List the algorithm to scheme mapping in effect
    Schemes,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => SignerConfig::load(path)?,
        None => SignerConfig::default(),
    };

    match cli.command {
        Commands::Sign(args) => commands::sign::handle(args, config)?,
        Commands::Schemes => commands::schemes::handle(&config),
    }

    Ok(())
}
