use super::{Scheduler, SelectView};

/// Shortest remaining time first, re-evaluated on every tick.
#[derive(Debug, Clone, Default)]
pub struct SrtfScheduler;

impl SrtfScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for SrtfScheduler {
    const NAME: &'static str = "SRTF";

    fn select(&mut self, view: &SelectView) -> Option<usize> {
        // Ties go to the earlier arrival, then to declaration order.
        view.ready.iter().copied().min_by_key(|&index| {
            let process = view.process(index);
            (process.remaining_time(), process.arrival_time(), index)
        })
    }

    fn reset(&mut self) {}

    fn ready_order(&self, view: &SelectView) -> Vec<usize> {
        let mut order = view.ready.to_vec();
        order.sort_by_key(|&index| view.process(index).remaining_time());
        order
    }
}
