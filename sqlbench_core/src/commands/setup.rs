use crate::commands::{TargetArgs, finish};
use crate::comparison::Comparison;
use crate::configuration::Configuration;
use crate::dataset;
use crate::report::{InsertTiming, Printer, compare_inserts};
use crate::schema;
use crate::target::{Session, connect_all};
use anyhow::Result;
use std::io;
use tracing::info;

/// Options for generating and loading the data set.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct LoadArgs {
    /// Number of users to generate
    #[arg(long)]
    pub records: Option<usize>,

    /// Rows per INSERT statement
    #[arg(long, value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Seed for reproducible data generation
    #[arg(long)]
    pub seed: Option<u64>,
}

fn parse_batch_size(value: &str) -> Result<usize, String> {
    let batch_size: usize = value.parse().map_err(|error| format!("{error}"))?;
    if (1..=dataset::MAX_BATCH_SIZE).contains(&batch_size) {
        Ok(batch_size)
    } else {
        Err(format!(
            "{batch_size} is not in 1..={}",
            dataset::MAX_BATCH_SIZE
        ))
    }
}

#[derive(Clone, Debug, Default, clap::Args)]
pub struct SetupArgs {
    #[clap(flatten)]
    pub targets: TargetArgs,

    #[clap(flatten)]
    pub load: LoadArgs,
}

/// Recreate the tables on every target, generate one data set and insert it into each
/// target.  Returns the insert timings in target order.
pub(crate) async fn load(
    configuration: &Configuration,
    args: &LoadArgs,
    sessions: &mut [Session],
    printer: &mut Printer<'_>,
) -> Result<Vec<InsertTiming>> {
    printer.line("Creating tables...")?;
    for session in sessions.iter_mut() {
        schema::recreate(session.connection.as_mut()).await?;
        printer.step(format!("{} tables created", session.target))?;
    }

    let records = args.records.unwrap_or(configuration.records);
    let batch_size = args.batch_size.unwrap_or(configuration.batch_size);
    let count = printer.count(records);
    printer.line(format!("\nGenerating {count} test records..."))?;
    let users = dataset::generate(records, &mut dataset::rng(args.seed));
    printer.success("Data generated")?;

    printer.line("\nInserting data...")?;
    let mut inserts = Vec::with_capacity(sessions.len());
    for session in sessions.iter_mut() {
        let stats = dataset::insert(session.connection.as_mut(), &users, batch_size).await?;
        let timing = InsertTiming::new(session.target.name.as_str(), &stats);
        info!(
            "{}: inserted {} rows in {:.2}s",
            timing.target, timing.rows, timing.seconds
        );
        printer.insert(&timing)?;
        inserts.push(timing);
    }
    Ok(inserts)
}

async fn run(
    configuration: &Configuration,
    args: &SetupArgs,
    sessions: &mut [Session],
    printer: &mut Printer<'_>,
) -> Result<(Vec<InsertTiming>, Option<Comparison>)> {
    printer.banner("SETUP")?;
    let inserts = load(configuration, &args.load, sessions, printer).await?;
    let comparison = compare_inserts(&inserts);
    printer.banner("INSERT RESULTS")?;
    printer.insert_summary(&inserts, comparison.as_ref())?;
    Ok((inserts, comparison))
}

/// Create the benchmark tables and load synthetic users into every target.
///
/// # Errors
/// * If a target cannot be reached or a statement fails
pub async fn execute(
    configuration: &Configuration,
    args: &SetupArgs,
    output: &mut dyn io::Write,
) -> Result<()> {
    let targets = args.targets.resolve(configuration)?;
    let mut printer = Printer::new(configuration, output);
    let mut sessions = connect_all(&targets).await?;
    let result = run(configuration, args, &mut sessions, &mut printer).await;
    let _ = finish(&mut sessions, result).await?;
    Ok(())
}
