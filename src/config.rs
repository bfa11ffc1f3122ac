//! Loader for the semicolon-delimited simulation file.
//!
//! ```text
//! # algorithm;quantum
//! PRIOP;2
//! # id;color;arrival;duration;priority[;dependency]
//! t01;#ff6666;0;5;2
//! t02;lightblue;1;3;4
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. The dependency column is accepted but
//! not modeled.

use crate::scheduler::{Policy, Process, SchedulerError, Simulation};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing `algorithm;quantum` header line")]
    MissingHeader,

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub policy_name: String,
    /// Values `<= 0` disable the quantum where the policy allows it.
    pub quantum: i64,
    pub processes: Vec<Process>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::parse(&text)?;
        debug!(
            path = %path.display(),
            policy = %config.policy_name,
            processes = config.processes.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (header_line, header) = lines.next().ok_or(ConfigError::MissingHeader)?;
        let fields = split_fields(header);
        let (policy_name, quantum) = match fields.as_slice() {
            [name] => (*name, 0),
            [name, quantum] => (*name, parse_number(header_line, "quantum", quantum)?),
            _ => {
                return Err(malformed(
                    header_line,
                    format!("expected `algorithm;quantum`, found {} fields", fields.len()),
                ))
            }
        };
        if policy_name.is_empty() {
            return Err(malformed(header_line, "empty algorithm name".to_owned()));
        }

        let processes = lines
            .map(|(line, text)| parse_process(line, text))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            policy_name: policy_name.to_owned(),
            quantum,
            processes,
        })
    }

    pub fn policy(&self) -> Result<Policy, SchedulerError> {
        Policy::from_name(&self.policy_name, self.quantum)
    }

    pub fn into_simulation(self) -> Result<Simulation, ConfigError> {
        let policy = self.policy()?;
        Ok(Simulation::new(self.processes, policy)?)
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(';').map(str::trim).collect()
}

fn malformed(line: usize, reason: String) -> ConfigError {
    ConfigError::Malformed { line, reason }
}

fn parse_number<T: std::str::FromStr>(
    line: usize,
    field: &str,
    text: &str,
) -> Result<T, ConfigError> {
    text.parse()
        .map_err(|_| malformed(line, format!("{field} must be a number, found {text:?}")))
}

fn parse_process(line: usize, text: &str) -> Result<Process, ConfigError> {
    let fields = split_fields(text);
    let [id, color, arrival, duration, priority, rest @ ..] = fields.as_slice() else {
        return Err(malformed(
            line,
            format!(
                "expected `id;color;arrival;duration;priority`, found {} fields",
                fields.len()
            ),
        ));
    };
    if rest.len() > 1 {
        return Err(malformed(line, format!("too many fields ({})", fields.len())));
    }
    if let Some(dependency) = rest.first().filter(|dependency| !dependency.is_empty()) {
        debug!(line, id, dependency, "ignoring process dependency");
    }

    Ok(Process::with_priority(
        id,
        color,
        parse_number(line, "arrival", arrival)?,
        parse_number(line, "duration", duration)?,
        parse_number(line, "priority", priority)?,
    ))
}
