use crate::commands::{TargetArgs, finish};
use crate::configuration::Configuration;
use crate::measurement::measure;
use crate::report::{Printer, QueryReport, Report, TargetTiming};
use crate::target::{Session, Target, connect_all};
use crate::workload::QUERIES;
use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Clone, Debug, Default, clap::Args)]
pub struct BenchArgs {
    #[clap(flatten)]
    pub targets: TargetArgs,

    /// Executions of each query per target
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Write the results as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Title of a report, e.g. "PostgreSQL vs MySQL".
pub(crate) fn title(targets: &[Target]) -> String {
    targets
        .iter()
        .map(|target| target.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ")
}

/// Run every workload query `iterations` times against each target in turn, printing the
/// results of each query as soon as all targets have run it.
pub(crate) async fn run_queries(
    sessions: &mut [Session],
    iterations: usize,
    printer: &mut Printer<'_>,
) -> Result<Vec<QueryReport>> {
    let mut reports = Vec::with_capacity(QUERIES.len());
    for query in QUERIES {
        let mut timings = Vec::with_capacity(sessions.len());
        for session in sessions.iter_mut() {
            let measurement = measure(session.connection.as_mut(), query.sql, iterations).await?;
            let timing = TargetTiming::new(session.target.name.as_str(), &measurement);
            info!(
                "{} {}: avg {:.2}ms",
                query.name, timing.target, timing.mean_ms
            );
            timings.push(timing);
        }
        let report = QueryReport::new(query.name, query.sql, timings);
        printer.query(&report)?;
        reports.push(report);
    }
    Ok(reports)
}

/// Save the report when an output file was requested.
pub(crate) fn save(report: &Report, path: Option<&Path>, printer: &mut Printer<'_>) -> Result<()> {
    if let Some(path) = path {
        report.save(path)?;
        printer.line(format!("\nResults written to {}", path.display()))?;
    }
    Ok(())
}

async fn run(
    iterations: usize,
    sessions: &mut [Session],
    printer: &mut Printer<'_>,
) -> Result<Vec<QueryReport>> {
    printer.banner("BENCHMARK RESULTS")?;
    run_queries(sessions, iterations, printer).await
}

/// Time the query workload against every target.
///
/// # Errors
/// * If a target cannot be reached, a query fails or the results cannot be written
pub async fn execute(
    configuration: &Configuration,
    args: &BenchArgs,
    output: &mut dyn io::Write,
) -> Result<()> {
    let targets = args.targets.resolve(configuration)?;
    let iterations = args.iterations.unwrap_or(configuration.iterations);
    let mut printer = Printer::new(configuration, output);

    let mut sessions = connect_all(&targets).await?;
    let result = run(iterations, &mut sessions, &mut printer).await;
    let queries = finish(&mut sessions, result).await?;

    let report = Report {
        title: title(&targets),
        iterations,
        inserts: Vec::new(),
        insert_comparison: None,
        queries,
    };
    save(&report, args.output.as_deref(), &mut printer)
}
