use super::{arrivals_at, Result, Scheduler, SchedulerError, SelectView, Ticks};
use std::collections::VecDeque;
use tracing::trace;

/// Cyclic dispatch: each process gets a burst of `min(quantum, remaining)` ticks, then goes to
/// the back of the rotation.
#[derive(Debug, Clone)]
pub struct RoundRobinScheduler {
    quantum: Ticks,
    rotation: VecDeque<usize>,
    current: Option<usize>,
    burst_left: Ticks,
}

impl RoundRobinScheduler {
    pub fn new(quantum: Ticks) -> Result<Self> {
        if quantum == 0 {
            return Err(SchedulerError::InvalidConfiguration(
                "round robin requires a quantum of at least 1, got 0".to_owned(),
            ));
        }

        Ok(Self {
            quantum,
            rotation: VecDeque::new(),
            current: None,
            burst_left: 0,
        })
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum
    }

    pub fn rotation(&self) -> &VecDeque<usize> {
        &self.rotation
    }

    /// Ends the current burst if it is used up, sending unfinished work to the tail.
    fn poll_process(&mut self, view: &SelectView) {
        let Some(current) = self.current else {
            return;
        };

        if view.process(current).is_completed() {
            self.current = None;
        } else if self.burst_left == 0 {
            trace!(tick = view.tick, process = current, "burst exhausted");
            self.rotation.push_back(current);
            self.current = None;
        }
    }

    fn dispatch(&mut self, view: &SelectView) {
        if let Some(next) = self.rotation.pop_front() {
            self.burst_left = self.quantum.min(view.process(next).remaining_time());
            self.current = Some(next);
        }
    }
}

impl Scheduler for RoundRobinScheduler {
    const NAME: &'static str = "Round Robin";

    fn select(&mut self, view: &SelectView) -> Option<usize> {
        // New arrivals queue up ahead of a process whose burst ends on the same tick.
        self.rotation.extend(arrivals_at(view.processes, view.tick));
        self.poll_process(view);

        if self.current.is_none() {
            self.dispatch(view);
        }
        if self.current.is_some() {
            self.burst_left -= 1;
        }
        self.current
    }

    fn reset(&mut self) {
        self.rotation.clear();
        self.current = None;
        self.burst_left = 0;
    }

    fn ready_order(&self, _view: &SelectView) -> Vec<usize> {
        self.current
            .into_iter()
            .chain(self.rotation.iter().copied())
            .collect()
    }
}
