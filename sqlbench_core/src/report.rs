use crate::chart::{ChartSpec, PALETTE, Series};
use crate::comparison::{Comparison, compare};
use crate::configuration::Configuration;
use crate::dataset::LoadStats;
use crate::measurement::Measurement;
use crate::schema::{IndexOutcome, TableSize};
use anyhow::{Result, bail};
use colored::Colorize;
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

const WIDTH: usize = 80;

/// Timing of one query against one target, in milliseconds.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TargetTiming {
    pub target: String,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl TargetTiming {
    #[must_use]
    pub fn new<S: Into<String>>(target: S, measurement: &Measurement) -> Self {
        Self {
            target: target.into(),
            mean_ms: milliseconds(measurement.mean()),
            min_ms: milliseconds(measurement.min()),
            max_ms: milliseconds(measurement.max()),
        }
    }
}

fn milliseconds(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Results of one workload query across all targets.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct QueryReport {
    pub name: String,
    pub sql: String,
    pub timings: Vec<TargetTiming>,
    pub comparison: Option<Comparison>,
}

impl QueryReport {
    #[must_use]
    pub fn new<S: Into<String>>(name: S, sql: S, timings: Vec<TargetTiming>) -> Self {
        let means: Vec<(&str, Duration)> = timings
            .iter()
            .map(|timing| {
                (
                    timing.target.as_str(),
                    Duration::try_from_secs_f64(timing.mean_ms / 1000.0).unwrap_or_default(),
                )
            })
            .collect();
        let comparison = compare(&means);
        Self {
            name: name.into(),
            sql: sql.into(),
            timings,
            comparison,
        }
    }
}

/// Bulk insert timing of one target.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct InsertTiming {
    pub target: String,
    pub rows: u64,
    pub seconds: f64,
    pub rows_per_second: f64,
}

impl InsertTiming {
    #[must_use]
    pub fn new<S: Into<String>>(target: S, stats: &LoadStats) -> Self {
        Self {
            target: target.into(),
            rows: stats.rows,
            seconds: stats.elapsed.as_secs_f64(),
            rows_per_second: stats.rows_per_second(),
        }
    }
}

/// Compare insert timings of all targets.
#[must_use]
pub fn compare_inserts(inserts: &[InsertTiming]) -> Option<Comparison> {
    let timings: Vec<(&str, Duration)> = inserts
        .iter()
        .map(|insert| {
            (
                insert.target.as_str(),
                Duration::try_from_secs_f64(insert.seconds).unwrap_or_default(),
            )
        })
        .collect();
    compare(&timings)
}

/// The complete result of a benchmark run, serialised by `bench --output`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub iterations: usize,
    #[serde(default)]
    pub inserts: Vec<InsertTiming>,
    #[serde(default)]
    pub insert_comparison: Option<Comparison>,
    pub queries: Vec<QueryReport>,
}

impl Report {
    /// Write the report as pretty printed JSON.
    ///
    /// # Errors
    /// * If the file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Read a report written by [`Report::save`].
    ///
    /// # Errors
    /// * If the file cannot be read or is not a report
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(BufReader::new(file))?;
        Ok(report)
    }

    /// Target names in the order they were benchmarked.
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = Vec::new();
        let names = self
            .inserts
            .iter()
            .map(|insert| &insert.target)
            .chain(
                self.queries
                    .iter()
                    .flat_map(|query| query.timings.iter().map(|timing| &timing.target)),
            );
        for name in names {
            if !targets.contains(name) {
                targets.push(name.clone());
            }
        }
        targets
    }

    /// Convert the query results into a grouped bar chart of mean times, one group per
    /// query and one series per target.
    ///
    /// # Errors
    /// * If the report has no query results
    pub fn to_chart(&self, file: &str) -> Result<ChartSpec> {
        if self.queries.is_empty() {
            bail!("Report contains no query results");
        }

        let categories = self.queries.iter().map(|query| query.name.clone()).collect();
        let series = self
            .targets()
            .into_iter()
            .enumerate()
            .map(|(index, target)| {
                let values = self
                    .queries
                    .iter()
                    .map(|query| {
                        query
                            .timings
                            .iter()
                            .find(|timing| timing.target == target)
                            .map_or(0.0, |timing| timing.mean_ms)
                    })
                    .collect();
                Series {
                    label: target,
                    colors: vec![PALETTE[index % PALETTE.len()].to_string()],
                    values,
                }
            })
            .collect();

        Ok(ChartSpec {
            file: file.to_string(),
            title: self.title.clone(),
            y_label: "Average time (ms)".to_string(),
            unit: "ms".to_string(),
            categories,
            series,
        })
    }
}

/// Writes human readable benchmark output.
pub struct Printer<'a> {
    output: &'a mut dyn io::Write,
    color: bool,
    locale: Locale,
}

impl<'a> Printer<'a> {
    pub fn new(configuration: &Configuration, output: &'a mut dyn io::Write) -> Self {
        Self {
            output,
            color: configuration.color,
            locale: configuration.locale,
        }
    }

    fn success_mark(&self) -> String {
        if self.color {
            "✓".green().to_string()
        } else {
            "✓".to_string()
        }
    }

    fn failure_mark(&self) -> String {
        if self.color {
            "✗".red().to_string()
        } else {
            "✗".to_string()
        }
    }

    /// Format a count using the configured locale (e.g. "100,000").
    #[must_use]
    pub fn count(&self, value: usize) -> String {
        value.to_formatted_string(&self.locale)
    }

    /// Write a line of text.
    ///
    /// # Errors
    /// * If the output cannot be written
    pub fn line<S: AsRef<str>>(&mut self, text: S) -> Result<()> {
        writeln!(self.output, "{}", text.as_ref())?;
        Ok(())
    }

    /// Write a title between two rules of `=`.
    ///
    /// # Errors
    /// * If the output cannot be written
    pub fn banner(&mut self, title: &str) -> Result<()> {
        let rule = "=".repeat(WIDTH);
        let title = if self.color {
            title.bold().to_string()
        } else {
            title.to_string()
        };
        writeln!(self.output, "\n{rule}\n{title}\n{rule}")?;
        Ok(())
    }

    /// Write a section heading followed by a rule of `-`.
    ///
    /// # Errors
    /// * If the output cannot be written
    pub fn section(&mut self, name: &str) -> Result<()> {
        writeln!(self.output, "\n{name}:\n{}", "-".repeat(WIDTH))?;
        Ok(())
    }

    /// # Errors
    /// * If the output cannot be written
    pub fn success<S: AsRef<str>>(&mut self, message: S) -> Result<()> {
        let mark = self.success_mark();
        writeln!(self.output, "{mark} {}", message.as_ref())?;
        Ok(())
    }

    /// Write an indented step of a procedure.
    ///
    /// # Errors
    /// * If the output cannot be written
    pub fn step<S: AsRef<str>>(&mut self, message: S) -> Result<()> {
        let mark = self.success_mark();
        writeln!(self.output, "  {mark} {}", message.as_ref())?;
        Ok(())
    }

    /// # Errors
    /// * If the output cannot be written
    pub fn timing(&mut self, timing: &TargetTiming) -> Result<()> {
        writeln!(
            self.output,
            "{:12} | Avg: {:7.2}ms | Min: {:7.2}ms | Max: {:7.2}ms",
            timing.target, timing.mean_ms, timing.min_ms, timing.max_ms
        )?;
        Ok(())
    }

    /// # Errors
    /// * If the output cannot be written
    pub fn comparison(&mut self, comparison: &Comparison) -> Result<()> {
        let winner = if self.color {
            comparison.winner.green().bold().to_string()
        } else {
            comparison.winner.clone()
        };
        writeln!(
            self.output,
            "{:12} | {winner} is faster by {:.1}%",
            "", comparison.percent
        )?;
        Ok(())
    }

    /// Write all timings of a query followed by the comparison.
    ///
    /// # Errors
    /// * If the output cannot be written
    pub fn query(&mut self, query: &QueryReport) -> Result<()> {
        self.section(&query.name)?;
        for timing in &query.timings {
            self.timing(timing)?;
        }
        if let Some(comparison) = &query.comparison {
            self.comparison(comparison)?;
        }
        Ok(())
    }

    /// # Errors
    /// * If the output cannot be written
    pub fn insert(&mut self, insert: &InsertTiming) -> Result<()> {
        self.success(format!(
            "{} INSERT: {:.2}s ({:.0} records/s)",
            insert.target, insert.seconds, insert.rows_per_second
        ))
    }

    /// Write every insert time followed by the insert comparison.
    ///
    /// # Errors
    /// * If the output cannot be written
    pub fn insert_summary(
        &mut self,
        inserts: &[InsertTiming],
        comparison: Option<&Comparison>,
    ) -> Result<()> {
        self.section("INSERT")?;
        for insert in inserts {
            writeln!(self.output, "{:12} | {:.2}s", insert.target, insert.seconds)?;
        }
        if let Some(comparison) = comparison {
            self.comparison(comparison)?;
        }
        Ok(())
    }

    /// # Errors
    /// * If the output cannot be written
    pub fn index(&mut self, outcome: &IndexOutcome) -> Result<()> {
        match &outcome.result {
            Ok(elapsed) => {
                self.step(format!(
                    "{}: {:.3}s",
                    outcome.index.name,
                    elapsed.as_secs_f64()
                ))?;
            }
            Err(error) => {
                let mark = self.failure_mark();
                writeln!(self.output, "  {mark} {}: {error}", outcome.index.name)?;
            }
        }
        Ok(())
    }

    /// # Errors
    /// * If the output cannot be written
    pub fn table_sizes(&mut self, target: &str, sizes: &[TableSize]) -> Result<()> {
        writeln!(self.output, "\n{target}:")?;
        for size in sizes {
            writeln!(self.output, "  {}: {:.2} MB", size.table, size.megabytes())?;
        }
        Ok(())
    }

    /// Write every query result of a report.
    ///
    /// # Errors
    /// * If the output cannot be written
    pub fn report(&mut self, report: &Report) -> Result<()> {
        if !report.inserts.is_empty() {
            self.insert_summary(&report.inserts, report.insert_comparison.as_ref())?;
        }
        for query in &report.queries {
            self.query(query)?;
        }
        self.output.flush()?;
        Ok(())
    }
}
