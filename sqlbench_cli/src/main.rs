#![forbid(unsafe_code)]

mod version;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use sqlbench_core::commands::{self, Command};
use sqlbench_core::configuration::ConfigurationBuilder;
use sqlbench_drivers::DriverManager;
use std::io;
use tracing::info;
use version::full_version;

/// Benchmark relational database servers against each other
#[derive(Debug, Parser)]
#[command(name = "sqlbench")]
pub(crate) struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Display the version of this tool
    #[arg(long)]
    version: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    execute(None, &mut io::stdout()).await
}

pub(crate) async fn execute(args: Option<Args>, output: &mut dyn io::Write) -> Result<()> {
    let args = match args {
        Some(args) => args,
        None => {
            let _ = dotenvy::dotenv();
            Args::try_parse()?
        }
    };

    let program_name = "sqlbench";
    let version = env!("CARGO_PKG_VERSION");
    let configuration = ConfigurationBuilder::new(program_name, version)
        .with_config()?
        .build()?;
    let version = full_version(&configuration);
    DriverManager::initialize()?;

    info!("{version} initialized");

    let result = match &args.command {
        _ if args.version => {
            writeln!(output, "{version}")?;
            Ok(())
        }
        Some(command) => commands::execute(&configuration, command, output).await,
        None => {
            write!(output, "{}", Args::command().render_help())?;
            Ok(())
        }
    };

    info!("{version} completed");
    result
}
