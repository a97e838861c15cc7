//! Main CLI application structure

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{check, exceptions_cmd};

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(author, version, about = "Reports drift between the CNCF landscape and the DevStats project registry")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare both catalogs and report every disagreement
    Check(check::CheckArgs),

    /// Show the effective exception tables
    Exceptions {
        /// Config file (TOML)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

/// Main entry point for the CLI.
///
/// Returns failure when drift was detected; fatal errors come back as `Err`.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("catalog-sync starting");

    let code = match cli.command {
        Commands::Check(args) => check::run(args, &output)?,
        Commands::Exceptions { config } => {
            output.verbose_ctx("exceptions", &format!("Config override: {:?}", config));
            exceptions_cmd::run(config.as_deref(), &output)?;
            ExitCode::SUCCESS
        }
    };

    output.verbose("Command completed");
    Ok(code)
}
