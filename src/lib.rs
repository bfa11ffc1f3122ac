pub mod config;
pub mod gantt;
pub mod scheduler;

pub use config::{ConfigError, ConfigFile};
pub use scheduler::{Policy, Process, Report, Simulation};
