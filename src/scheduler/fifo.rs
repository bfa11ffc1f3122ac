use super::{arrivals_at, Scheduler, SelectView};
use std::collections::VecDeque;

/// First come, first served. The head of the queue runs until it completes.
#[derive(Debug, Clone, Default)]
pub struct FifoScheduler {
    queue: VecDeque<usize>,
}

impl FifoScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &VecDeque<usize> {
        &self.queue
    }
}

impl Scheduler for FifoScheduler {
    const NAME: &'static str = "FIFO";

    fn select(&mut self, view: &SelectView) -> Option<usize> {
        // The head is only dropped once it has finished.
        while let Some(&head) = self.queue.front() {
            if !view.process(head).is_completed() {
                break;
            }
            self.queue.pop_front();
        }
        self.queue.extend(arrivals_at(view.processes, view.tick));
        self.queue.front().copied()
    }

    fn reset(&mut self) {
        self.queue.clear();
    }

    fn ready_order(&self, view: &SelectView) -> Vec<usize> {
        self.queue
            .iter()
            .copied()
            .filter(|&index| !view.process(index).is_completed())
            .collect()
    }
}
