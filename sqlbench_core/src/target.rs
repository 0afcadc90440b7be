use anyhow::{Result, bail};
use sqlbench_drivers::{Connection, DriverManager};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use tracing::{info, instrument};
use url::Url;

/// A named database URL benchmarked in a run, parsed from `[name=]scheme://...`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    pub name: String,
    pub url: String,
}

impl Target {
    pub fn new<S: Into<String>>(name: S, url: S) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// The URL with any password replaced, suitable for logging.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        match Url::parse(&self.url) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.to_string()
            }
            Err(_) => self.url.clone(),
        }
    }
}

fn default_name(scheme: &str) -> String {
    match scheme {
        "mariadb" => "MariaDB".to_string(),
        "mysql" => "MySQL".to_string(),
        "postgresql" => "PostgreSQL".to_string(),
        scheme => scheme.to_string(),
    }
}

impl FromStr for Target {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if let Some((name, url)) = value.split_once('=') {
            let name = name.trim();
            if !name.is_empty() && !name.contains("://") {
                if url.trim().is_empty() {
                    bail!("Missing URL for target {name}");
                }
                return Ok(Self::new(name, url.trim()));
            }
        }

        let Some((scheme, _)) = value.split_once("://") else {
            bail!("Invalid target URL: {value}");
        };
        if scheme.is_empty() {
            bail!("Invalid target URL: {value}");
        }
        Ok(Self::new(default_name(scheme).as_str(), value))
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Parse every target, rejecting duplicate names.
///
/// # Errors
/// * If a target cannot be parsed, no targets are given or two targets share a name
pub fn parse_targets<S: AsRef<str>>(values: &[S]) -> Result<Vec<Target>> {
    let mut targets: Vec<Target> = Vec::with_capacity(values.len());
    for value in values {
        let target = Target::from_str(value.as_ref())?;
        if targets.iter().any(|existing| existing.name == target.name) {
            bail!("Duplicate target name: {}", target.name);
        }
        targets.push(target);
    }
    if targets.is_empty() {
        bail!("No targets configured");
    }
    Ok(targets)
}

/// An open connection to a benchmark target.
pub struct Session {
    pub target: Target,
    pub connection: Box<dyn Connection>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("target", &self.target.name)
            .field("url", &self.target.redacted_url())
            .finish_non_exhaustive()
    }
}

/// Connect to every target in order.  Connections that were already opened are closed
/// when a later target fails to connect.
///
/// # Errors
/// * If any target fails to connect
#[instrument(level = "info", skip(targets))]
pub async fn connect_all(targets: &[Target]) -> Result<Vec<Session>> {
    let mut sessions = Vec::with_capacity(targets.len());
    for target in targets {
        info!("Connecting to {}: {}", target.name, target.redacted_url());
        match DriverManager::connect(&target.url).await {
            Ok(connection) => sessions.push(Session {
                target: target.clone(),
                connection,
            }),
            Err(error) => {
                close_all(&mut sessions).await?;
                bail!("Failed to connect to {}: {error}", target.name);
            }
        }
    }
    Ok(sessions)
}

/// Close every session.
///
/// # Errors
/// * If a connection fails to close
pub async fn close_all(sessions: &mut [Session]) -> Result<()> {
    for session in sessions.iter_mut() {
        session.connection.close().await?;
    }
    Ok(())
}
