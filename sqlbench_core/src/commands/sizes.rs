use crate::commands::{TargetArgs, finish};
use crate::configuration::Configuration;
use crate::report::Printer;
use crate::schema::table_sizes;
use crate::target::{Session, connect_all};
use anyhow::Result;
use std::io;

/// Print the size of the benchmark tables of every target.
pub(crate) async fn show(sessions: &mut [Session], printer: &mut Printer<'_>) -> Result<()> {
    printer.banner("TABLE SIZES")?;
    for session in sessions.iter_mut() {
        let sizes = table_sizes(session.connection.as_mut()).await?;
        printer.table_sizes(&session.target.name, &sizes)?;
    }
    Ok(())
}

/// Show the size of the `users` and `orders` tables of every target.
///
/// # Errors
/// * If a target cannot be reached or the sizes cannot be queried
pub async fn execute(
    configuration: &Configuration,
    args: &TargetArgs,
    output: &mut dyn io::Write,
) -> Result<()> {
    let targets = args.resolve(configuration)?;
    let mut printer = Printer::new(configuration, output);
    let mut sessions = connect_all(&targets).await?;
    let result = show(&mut sessions, &mut printer).await;
    finish(&mut sessions, result).await
}
