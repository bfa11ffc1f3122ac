use super::{Scheduler, SelectView, Ticks};
use std::cmp::Reverse;
use tracing::trace;

/// Preemptive priority scheduling with an optional quantum.
///
/// The highest `priority` wins every tick. When a quantum is set, a process that has held the
/// processor for `quantum` consecutive ticks is reconsidered, but it keeps running if it is
/// still the best candidate. Its open slice is kept rather than closed and reopened at the
/// boundary, so a quantum expiry alone never splits the Gantt bar.
#[derive(Debug, Clone, Default)]
pub struct PriorityScheduler {
    quantum: Option<Ticks>,
    current: Option<usize>,
    run_ticks: Ticks,
}

impl PriorityScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// `quantum <= 0` disables the quantum trigger.
    pub fn with_quantum(quantum: i64) -> Self {
        Self {
            quantum: Ticks::try_from(quantum).ok().filter(|&quantum| quantum > 0),
            ..Self::default()
        }
    }

    pub fn quantum(&self) -> Option<Ticks> {
        self.quantum
    }

    /// Consecutive ticks the current process has run since it was last (re)selected.
    pub fn run_ticks(&self) -> Ticks {
        self.run_ticks
    }

    fn quantum_expired(&self) -> bool {
        self.quantum.is_some_and(|quantum| self.run_ticks >= quantum)
    }

    fn best_candidate(view: &SelectView) -> Option<usize> {
        // Highest priority first, then earliest arrival, then declaration order.
        view.ready.iter().copied().min_by_key(|&index| {
            let process = view.process(index);
            (Reverse(process.priority()), process.arrival_time(), index)
        })
    }
}

impl Scheduler for PriorityScheduler {
    const NAME: &'static str = "Preemptive Priority";

    fn select(&mut self, view: &SelectView) -> Option<usize> {
        let top = Self::best_candidate(view);
        let expired = self.quantum_expired();

        if top != self.current || expired {
            if expired && top == self.current {
                trace!(tick = view.tick, "quantum expired with no contender");
            }
            self.current = top;
            self.run_ticks = 0;
        }

        if top.is_some() {
            self.run_ticks += 1;
        }
        top
    }

    fn reset(&mut self) {
        self.current = None;
        self.run_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{ready_set, Process};

    fn select(
        scheduler: &mut PriorityScheduler,
        processes: &[Process],
        tick: Ticks,
    ) -> Option<usize> {
        let ready = ready_set(processes, tick);
        scheduler.select(&SelectView {
            tick,
            processes,
            ready: &ready,
        })
    }

    #[test]
    fn larger_priority_wins() {
        let processes = vec![
            Process::with_priority("low", "red", 0, 3, 1),
            Process::with_priority("high", "blue", 0, 3, 7),
        ];
        assert_eq!(
            select(&mut PriorityScheduler::new(), &processes, 0),
            Some(1)
        );
    }

    #[test]
    fn equal_priority_goes_to_earlier_arrival() {
        let processes = vec![
            Process::with_priority("second", "red", 1, 3, 4),
            Process::with_priority("first", "blue", 0, 3, 4),
        ];
        let mut scheduler = PriorityScheduler::new();
        for tick in 1..4 {
            assert_eq!(select(&mut scheduler, &processes, tick), Some(1));
        }
    }

    #[test]
    fn quantum_resets_counter_without_a_contender() {
        let processes = vec![Process::with_priority("solo", "red", 0, 5, 1)];
        let mut scheduler = PriorityScheduler::with_quantum(2);

        assert_eq!(select(&mut scheduler, &processes, 0), Some(0));
        assert_eq!(select(&mut scheduler, &processes, 1), Some(0));
        assert_eq!(scheduler.run_ticks(), 2);
        assert_eq!(select(&mut scheduler, &processes, 2), Some(0));
        assert_eq!(scheduler.run_ticks(), 1);
    }

    #[test]
    fn non_positive_quantum_is_disabled() {
        assert_eq!(PriorityScheduler::with_quantum(0).quantum(), None);
        assert_eq!(PriorityScheduler::with_quantum(-4).quantum(), None);
        assert_eq!(PriorityScheduler::with_quantum(3).quantum(), Some(3));
    }
}
