use crate::commands::{TargetArgs, finish, sizes};
use crate::configuration::Configuration;
use crate::report::Printer;
use crate::schema::{create_indexes, maintain};
use crate::target::{Session, connect_all};
use anyhow::Result;
use std::io;

async fn run(sessions: &mut [Session], printer: &mut Printer<'_>) -> Result<()> {
    printer.banner("DATABASE OPTIMIZATION")?;
    for session in sessions.iter_mut() {
        printer.line(format!("\n{} optimization...", session.target))?;
        for outcome in create_indexes(session.connection.as_mut()).await {
            printer.index(&outcome)?;
        }
        let statement = maintain(session.connection.as_mut()).await?;
        printer.step(format!("{statement} completed"))?;
    }
    sizes::show(sessions, printer).await
}

/// Create the benchmark indexes on every target, run table maintenance and show the
/// resulting table sizes.  Failing indexes are reported and do not stop the run.
///
/// # Errors
/// * If a target cannot be reached, maintenance fails or the sizes cannot be queried
pub async fn execute(
    configuration: &Configuration,
    args: &TargetArgs,
    output: &mut dyn io::Write,
) -> Result<()> {
    let targets = args.resolve(configuration)?;
    let mut printer = Printer::new(configuration, output);
    let mut sessions = connect_all(&targets).await?;
    let result = run(&mut sessions, &mut printer).await;
    finish(&mut sessions, result).await
}
