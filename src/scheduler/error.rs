use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors raised before a simulation is allowed to start.
///
/// The tick loop itself is deterministic and cannot fail once a [`Simulation`] has been built,
/// so every variant here describes bad input rather than a runtime fault.
///
/// [`Simulation`]: super::Simulation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("invalid process {id:?}: {reason}")]
    InvalidProcess { id: String, reason: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown scheduling policy {0:?}")]
    UnknownPolicy(String),
}
