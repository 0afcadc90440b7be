use anyhow::{Result, bail};
use indicatif::ProgressStyle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlbench_drivers::{Connection, ToSql, Value};
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};
use tracing::{Span, debug, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Largest number of rows per insert statement; each row binds four parameters and
/// the drivers encode the parameter count of a statement as an `i16`.
pub const MAX_BATCH_SIZE: usize = i16::MAX as usize / 4;

/// Account status of a generated user.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
    Suspended,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Active, Status::Inactive, Status::Suspended];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Suspended => "suspended",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Status {
    fn to_value(&self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

/// A synthetic row of the `users` table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub status: Status,
    pub balance: Decimal,
}

impl User {
    fn random<R: Rng>(index: usize, rng: &mut R) -> Self {
        let status = Status::ALL[rng.random_range(0..Status::ALL.len())];
        let cents: i64 = rng.random_range(0..=1_000_000);
        Self {
            username: format!("user_{index}"),
            email: format!("user_{index}@example.com"),
            status,
            balance: Decimal::new(cents, 2),
        }
    }
}

/// Create the random number generator for a data set; a seed makes it reproducible.
#[must_use]
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Generate `count` users.
pub fn generate<R: Rng>(count: usize, rng: &mut R) -> Vec<User> {
    (0..count).map(|index| User::random(index, rng)).collect()
}

/// Statistics for loading a data set into a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadStats {
    pub rows: u64,
    pub elapsed: Duration,
}

impl LoadStats {
    #[must_use]
    pub fn rows_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.rows as f64 / seconds
        } else {
            0.0
        }
    }
}

fn insert_sql(rows: usize) -> String {
    let values = vec!["(?, ?, ?, ?)"; rows].join(", ");
    format!("INSERT INTO users (username, email, status, balance) VALUES {values}")
}

/// Insert the users with multi-row `INSERT` statements of at most `batch_size` rows.
///
/// # Errors
/// * If `batch_size` is zero or larger than [`MAX_BATCH_SIZE`]
/// * If an insert statement fails
#[instrument(name = "insert", level = "info", skip_all, fields(rows = users.len()))]
pub async fn insert(
    connection: &mut dyn Connection,
    users: &[User],
    batch_size: usize,
) -> Result<LoadStats> {
    if !(1..=MAX_BATCH_SIZE).contains(&batch_size) {
        bail!("Invalid batch size: {batch_size}; expected 1 to {MAX_BATCH_SIZE}");
    }
    let span = Span::current();
    span.pb_set_style(&ProgressStyle::with_template(
        "{span_child_prefix}{span_name} {wide_bar} {pos}/{len}",
    )?);
    span.pb_set_length(users.len() as u64);

    let start = Instant::now();
    let mut rows = 0;
    for batch in users.chunks(batch_size) {
        let sql = insert_sql(batch.len());
        let mut params: Vec<&dyn ToSql> = Vec::with_capacity(batch.len() * 4);
        for user in batch {
            params.push(&user.username);
            params.push(&user.email);
            params.push(&user.status);
            params.push(&user.balance);
        }
        rows += connection.execute(&sql, &params).await?;
        span.pb_inc(batch.len() as u64);
    }
    let elapsed = start.elapsed();
    debug!("Inserted {rows} rows in {elapsed:?}");

    Ok(LoadStats { rows, elapsed })
}
