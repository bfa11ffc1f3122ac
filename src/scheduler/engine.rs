use super::{
    ready_set, runner::StepCommand, Policy, Process, Report, Result, SchedulerError, SelectView,
    StepControl, Ticks, Trace,
};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Aborted,
}

/// What happened during one tick, as shown to a step controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: Ticks,
    /// `None` when the processor was idle.
    pub running: Option<String>,
    /// Ready process ids in the policy's display order.
    pub ready: Vec<String>,
}

/// The tick loop shared by every policy.
///
/// Owns the process records for the length of a run; ready sets and the open slice are plain
/// indices into `processes`.
#[derive(Debug)]
pub struct Simulation {
    processes: Vec<Process>,
    policy: Policy,
    tick: Ticks,
    running: Option<usize>,
    trace: Trace,
}

impl Simulation {
    pub fn new(mut processes: Vec<Process>, mut policy: Policy) -> Result<Self> {
        let mut ids = HashSet::new();
        for process in &processes {
            let reason = if process.id().is_empty() {
                Some("id must not be empty")
            } else if process.duration() == 0 {
                Some("duration must be at least one tick")
            } else if !ids.insert(process.id()) {
                Some("id is used by another process")
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(SchedulerError::InvalidProcess {
                    id: process.id().to_owned(),
                    reason,
                });
            }
        }

        processes.iter_mut().for_each(Process::reset);
        policy.reset();
        debug!(
            policy = policy.name(),
            processes = processes.len(),
            "simulation ready"
        );

        Ok(Self {
            processes,
            policy,
            tick: 0,
            running: None,
            trace: Trace::new(),
        })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn into_processes(self) -> Vec<Process> {
        self.processes
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// The next tick to be simulated; after completion, the tick the run finished at.
    pub fn now(&self) -> Ticks {
        self.tick
    }

    pub fn state(&self) -> RunState {
        if self.processes.iter().all(Process::is_completed) {
            RunState::Done
        } else {
            RunState::Running
        }
    }

    pub fn is_done(&self) -> bool {
        self.state() == RunState::Done
    }

    pub fn report(&self) -> Report {
        Report::from_processes(&self.processes)
    }

    /// Simulates a single tick. Returns `None` once the run is done.
    pub fn step(&mut self) -> Option<Snapshot> {
        if self.is_done() {
            return None;
        }

        let tick = self.tick;
        let ready = ready_set(&self.processes, tick);
        let view = SelectView {
            tick,
            processes: &self.processes,
            ready: &ready,
        };
        let selected = self.policy.select(&view);
        let ready_order = self.policy.ready_order(&view);

        debug_assert!(
            selected.map_or(true, |index| ready.contains(&index)),
            "policy selected a process that is not ready"
        );

        match selected {
            Some(index) => self.execute(index, tick),
            None => {
                if let Some(previous) = self.running.take() {
                    self.processes[previous].close_slice(tick);
                }
                trace!(tick, "idle");
            }
        }

        let snapshot = Snapshot {
            tick,
            running: selected.map(|index| self.processes[index].id().to_owned()),
            ready: ready_order
                .into_iter()
                .map(|index| self.processes[index].id().to_owned())
                .collect(),
        };

        self.tick += 1;
        Some(snapshot)
    }

    fn execute(&mut self, index: usize, tick: Ticks) {
        if self.running != Some(index) {
            if let Some(previous) = self.running {
                debug!(
                    tick,
                    from = self.processes[previous].id(),
                    to = self.processes[index].id(),
                    "preempted"
                );
                self.processes[previous].close_slice(tick);
            } else {
                debug!(tick, process = self.processes[index].id(), "dispatched");
            }
            self.processes[index].open_slice(tick);
        }

        let process = &mut self.processes[index];
        let finished = process.run_tick(tick);
        self.trace.record(index, tick);
        trace!(tick, process = process.id(), remaining = process.remaining_time());

        if finished {
            debug!(tick, process = process.id(), finish = tick + 1, "completed");
            self.running = None;
        } else {
            self.running = Some(index);
        }
    }

    /// Runs unattended until every process has completed.
    pub fn run(&mut self) -> &Trace {
        while self.step().is_some() {}
        &self.trace
    }

    /// Runs with a pause point after every tick. The controller decides whether to continue,
    /// run the rest unattended, or abort. A controller whose channel has gone away is
    /// dropped and the run finishes on its own.
    pub fn run_stepped<C: StepControl + ?Sized>(&mut self, control: &mut C) -> RunOutcome {
        while let Some(snapshot) = self.step() {
            match control.acknowledge(&snapshot, &self.processes) {
                Ok(StepCommand::Continue) => {}
                Ok(StepCommand::RunToEnd) => break,
                Ok(StepCommand::Abort) => {
                    debug!(tick = snapshot.tick, "run aborted");
                    return RunOutcome::Aborted;
                }
                Err(err) => {
                    warn!(tick = snapshot.tick, "{err}, running to completion");
                    break;
                }
            }
        }

        self.run();
        RunOutcome::Completed
    }
}
