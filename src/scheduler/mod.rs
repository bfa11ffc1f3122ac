mod display;
mod engine;
mod error;
mod fifo;
mod priority;
mod process;
mod ready;
mod round_robin;
mod runner;
mod srtf;
mod stats;
mod trace;

pub use display::DisplayTerminal;
pub use engine::{RunOutcome, RunState, Simulation, Snapshot};
pub use error::{Result, SchedulerError};
pub use fifo::FifoScheduler;
pub use priority::PriorityScheduler;
pub use process::Process;
pub use ready::{arrivals_at, ready_set};
pub use round_robin::RoundRobinScheduler;
pub use runner::{ChannelClosed, ChannelControl, LineControl, StepCommand, StepControl};
pub use srtf::SrtfScheduler;
pub use stats::{ProcessStats, Report};
pub use trace::{slice_spans, Slice, Span, Trace, TraceEntry};

/// Simulated time, in ticks.
pub type Ticks = u64;

/// What a policy gets to look at when picking the process for one tick.
pub struct SelectView<'a> {
    pub tick: Ticks,
    pub processes: &'a [Process],
    /// Ready processes in declaration order.
    pub ready: &'a [usize],
}

impl SelectView<'_> {
    pub fn process(&self, index: usize) -> &Process {
        &self.processes[index]
    }
}

pub trait Scheduler {
    const NAME: &'static str;

    /// Picks the process that runs during `view.tick`, or `None` to leave the processor idle.
    /// Called exactly once per tick.
    fn select(&mut self, view: &SelectView) -> Option<usize>;

    /// Forgets everything carried over from a previous run. Configuration such as the
    /// quantum is kept.
    fn reset(&mut self);

    /// Ready processes in the order this policy would present them.
    fn ready_order(&self, view: &SelectView) -> Vec<usize> {
        view.ready.to_vec()
    }
}

/// The dispatch policy driving a [`Simulation`].
#[derive(Debug, Clone)]
pub enum Policy {
    Fifo(FifoScheduler),
    Srtf(SrtfScheduler),
    Priority(PriorityScheduler),
    RoundRobin(RoundRobinScheduler),
}

impl Policy {
    /// Builds a policy from its configuration name.
    ///
    /// `quantum <= 0` disables time slicing for the priority policy and is rejected for
    /// round-robin, which cannot run without a positive quantum.
    pub fn from_name(name: &str, quantum: i64) -> Result<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "FIFO" | "FCFS" => Ok(Policy::Fifo(FifoScheduler::new())),
            "SRTF" | "SJF" => Ok(Policy::Srtf(SrtfScheduler::new())),
            "PRIOP" | "PRIO" | "PRIORITY" | "PRIORIDADE" => {
                Ok(Policy::Priority(PriorityScheduler::with_quantum(quantum)))
            }
            "RR" | "ROUND_ROBIN" | "ROUNDROBIN" => {
                let ticks = Ticks::try_from(quantum).map_err(|_| {
                    SchedulerError::InvalidConfiguration(format!(
                        "round robin requires a quantum of at least 1, got {quantum}"
                    ))
                })?;
                Ok(Policy::RoundRobin(RoundRobinScheduler::new(ticks)?))
            }
            _ => Err(SchedulerError::UnknownPolicy(name.to_owned())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fifo(_) => FifoScheduler::NAME,
            Policy::Srtf(_) => SrtfScheduler::NAME,
            Policy::Priority(_) => PriorityScheduler::NAME,
            Policy::RoundRobin(_) => RoundRobinScheduler::NAME,
        }
    }

    pub fn select(&mut self, view: &SelectView) -> Option<usize> {
        match self {
            Policy::Fifo(scheduler) => scheduler.select(view),
            Policy::Srtf(scheduler) => scheduler.select(view),
            Policy::Priority(scheduler) => scheduler.select(view),
            Policy::RoundRobin(scheduler) => scheduler.select(view),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Policy::Fifo(scheduler) => scheduler.reset(),
            Policy::Srtf(scheduler) => scheduler.reset(),
            Policy::Priority(scheduler) => scheduler.reset(),
            Policy::RoundRobin(scheduler) => scheduler.reset(),
        }
    }

    pub fn ready_order(&self, view: &SelectView) -> Vec<usize> {
        match self {
            Policy::Fifo(scheduler) => scheduler.ready_order(view),
            Policy::Srtf(scheduler) => scheduler.ready_order(view),
            Policy::Priority(scheduler) => scheduler.ready_order(view),
            Policy::RoundRobin(scheduler) => scheduler.ready_order(view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_names_are_case_insensitive() {
        assert!(matches!(Policy::from_name("fifo", 0), Ok(Policy::Fifo(_))));
        assert!(matches!(Policy::from_name(" Srtf ", 0), Ok(Policy::Srtf(_))));
        assert!(matches!(
            Policy::from_name("PRIOP", -1),
            Ok(Policy::Priority(_))
        ));
        assert!(matches!(
            Policy::from_name("rr", 2),
            Ok(Policy::RoundRobin(_))
        ));
    }

    #[test]
    fn rejects_unknown_policy() {
        assert_eq!(
            Policy::from_name("lottery", 1).unwrap_err(),
            SchedulerError::UnknownPolicy("lottery".to_owned())
        );
    }

    #[test]
    fn round_robin_requires_positive_quantum() {
        for quantum in [0, -3] {
            assert!(matches!(
                Policy::from_name("RR", quantum),
                Err(SchedulerError::InvalidConfiguration(_))
            ));
        }
    }
}
