use crate::chart::{published, write_charts};
use crate::configuration::Configuration;
use crate::report::{Printer, Report};
use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, clap::Args)]
pub struct ChartArgs {
    /// A JSON report written by `bench --output`; the published results are charted when
    /// omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory the charts are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

fn chart_file(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map_or_else(|| "report".into(), |stem| stem.to_string_lossy());
    format!("{stem}.svg")
}

/// Render bar charts of a benchmark report, or of the published results.
///
/// # Errors
/// * If the report cannot be read or a chart cannot be written
pub fn execute(
    configuration: &Configuration,
    args: &ChartArgs,
    output: &mut dyn io::Write,
) -> Result<()> {
    let charts = match &args.input {
        Some(input) => {
            let report = Report::load(input)?;
            vec![report.to_chart(&chart_file(input))?]
        }
        None => published()?,
    };
    let directory = args
        .output_dir
        .clone()
        .unwrap_or_else(|| configuration.chart_dir.clone());

    let files = write_charts(&charts, &directory)?;

    let mut printer = Printer::new(configuration, output);
    printer.banner("CHARTS GENERATED")?;
    for (index, file) in files.iter().enumerate() {
        printer.line(format!("  {}. {}", index + 1, file.display()))?;
    }
    Ok(())
}
