use anyhow::{Result, bail};
use sqlbench_drivers::Connection;
use std::time::{Duration, Instant};
use tracing::{instrument, trace};

/// Wall-clock samples of repeated executions of one query against one target.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    samples: Vec<Duration>,
}

impl Measurement {
    /// Create a measurement from samples.
    ///
    /// # Errors
    /// * If no samples are given
    pub fn new(samples: Vec<Duration>) -> Result<Self> {
        if samples.is_empty() {
            bail!("A measurement requires at least one sample");
        }
        Ok(Self { samples })
    }

    #[must_use]
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    #[must_use]
    pub fn mean(&self) -> Duration {
        let total: Duration = self.samples.iter().sum();
        let count = u32::try_from(self.samples.len()).unwrap_or(u32::MAX);
        total / count
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        self.samples.iter().min().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.samples.iter().max().copied().unwrap_or_default()
    }
}

/// Execute `sql` `iterations` times, timing the query and the fetch of every row.
///
/// # Errors
/// * If `iterations` is zero or the query fails
#[instrument(level = "debug", skip(connection))]
pub async fn measure(
    connection: &mut dyn Connection,
    sql: &str,
    iterations: usize,
) -> Result<Measurement> {
    if iterations == 0 {
        bail!("Iterations must be greater than zero");
    }

    let mut samples = Vec::with_capacity(iterations);
    for iteration in 0..iterations {
        let start = Instant::now();
        let mut result = connection.query(sql, &[]).await?;
        let rows = result.drain().await;
        let elapsed = start.elapsed();
        trace!("Iteration {iteration}: {rows} rows in {elapsed:?}");
        samples.push(elapsed);
    }
    Measurement::new(samples)
}
