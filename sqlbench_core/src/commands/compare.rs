use crate::commands::bench::{run_queries, save, title};
use crate::commands::setup::{LoadArgs, load};
use crate::commands::{TargetArgs, finish};
use crate::configuration::Configuration;
use crate::report::{Printer, Report, compare_inserts};
use crate::target::{Session, connect_all};
use anyhow::Result;
use std::io;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, clap::Args)]
pub struct CompareArgs {
    #[clap(flatten)]
    pub targets: TargetArgs,

    #[clap(flatten)]
    pub load: LoadArgs,

    /// Executions of each query per target
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Write the results as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

async fn run(
    configuration: &Configuration,
    args: &CompareArgs,
    title: String,
    sessions: &mut [Session],
    printer: &mut Printer<'_>,
) -> Result<Report> {
    let iterations = args.iterations.unwrap_or(configuration.iterations);

    printer.banner(&format!("SETUP - {title}"))?;
    let inserts = load(configuration, &args.load, sessions, printer).await?;
    let insert_comparison = compare_inserts(&inserts);

    printer.banner("BENCHMARK RESULTS")?;
    printer.insert_summary(&inserts, insert_comparison.as_ref())?;
    let queries = run_queries(sessions, iterations, printer).await?;

    Ok(Report {
        title,
        iterations,
        inserts,
        insert_comparison,
        queries,
    })
}

/// Load a fresh data set into every target and benchmark it on the same connections.
///
/// # Errors
/// * If a target cannot be reached, a statement fails or the results cannot be written
pub async fn execute(
    configuration: &Configuration,
    args: &CompareArgs,
    output: &mut dyn io::Write,
) -> Result<()> {
    let targets = args.targets.resolve(configuration)?;
    let mut printer = Printer::new(configuration, output);

    let mut sessions = connect_all(&targets).await?;
    let result = run(
        configuration,
        args,
        title(&targets),
        &mut sessions,
        &mut printer,
    )
    .await;
    let report = finish(&mut sessions, result).await?;

    save(&report, args.output.as_deref(), &mut printer)
}
