use super::{trace::Slice, Ticks};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    id: String,
    color: String,
    arrival_time: Ticks,
    duration: Ticks,
    priority: i32,

    remaining_time: Ticks,
    start_time: Option<Ticks>,
    finish_time: Option<Ticks>,
    completed: bool,
    slices: Vec<Slice>,
}

impl Process {
    const DEFAULT_COLOR: &'static str = "steelblue";
    const DEFAULT_PRIORITY: i32 = 0;

    pub fn new(id: &str, arrival_time: Ticks, duration: Ticks) -> Self {
        Process::colored(id, Process::DEFAULT_COLOR, arrival_time, duration)
    }

    pub fn colored(id: &str, color: &str, arrival_time: Ticks, duration: Ticks) -> Self {
        Process::with_priority(id, color, arrival_time, duration, Process::DEFAULT_PRIORITY)
    }

    pub fn with_priority(
        id: &str,
        color: &str,
        arrival_time: Ticks,
        duration: Ticks,
        priority: i32,
    ) -> Self {
        Self {
            id: id.to_owned(),
            color: color.to_owned(),
            arrival_time,
            duration,
            priority,
            remaining_time: duration,
            start_time: None,
            finish_time: None,
            completed: false,
            slices: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn arrival_time(&self) -> Ticks {
        self.arrival_time
    }

    pub fn duration(&self) -> Ticks {
        self.duration
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn remaining_time(&self) -> Ticks {
        self.remaining_time
    }

    pub fn start_time(&self) -> Option<Ticks> {
        self.start_time
    }

    pub fn finish_time(&self) -> Option<Ticks> {
        self.finish_time
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Whether this process is ready to run at `tick`.
    pub fn is_ready_at(&self, tick: Ticks) -> bool {
        !self.completed && self.arrival_time <= tick
    }

    pub(crate) fn has_open_slice(&self) -> bool {
        self.slices.last().is_some_and(Slice::is_open)
    }

    /// Clears all simulation state so the record can be fed to a fresh run.
    pub(crate) fn reset(&mut self) {
        self.remaining_time = self.duration;
        self.start_time = None;
        self.finish_time = None;
        self.completed = false;
        self.slices.clear();
    }

    pub(crate) fn open_slice(&mut self, tick: Ticks) {
        debug_assert!(!self.has_open_slice(), "{} already owns an open slice", self.id);
        self.slices.push(Slice::open(tick));
    }

    pub(crate) fn close_slice(&mut self, tick: Ticks) {
        if let Some(slice) = self.slices.last_mut().filter(|slice| slice.is_open()) {
            slice.close(tick);
        }
    }

    /// Executes one unit of work at `tick`. Returns true if this was the last unit.
    pub(crate) fn run_tick(&mut self, tick: Ticks) -> bool {
        debug_assert!(!self.completed, "{} ran after completion", self.id);
        debug_assert!(
            tick >= self.arrival_time,
            "{} ran before its arrival",
            self.id
        );

        self.start_time.get_or_insert(tick);
        self.remaining_time -= 1;

        if self.remaining_time == 0 {
            self.completed = true;
            self.finish_time = Some(tick + 1);
            self.close_slice(tick + 1);
        }
        self.completed
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | arrival: {} | duration: {} | priority: {}",
            self.id, self.arrival_time, self.duration, self.priority
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_tick_tracks_start_and_completion() {
        let mut process = Process::new("A", 1, 2);
        process.open_slice(1);

        assert!(!process.run_tick(1));
        assert_eq!(process.start_time(), Some(1));
        assert_eq!(process.remaining_time(), 1);
        assert!(process.has_open_slice());

        assert!(process.run_tick(2));
        assert!(process.is_completed());
        assert_eq!(process.finish_time(), Some(3));
        assert_eq!(process.slices(), &[Slice::closed(1, 3)]);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut process = Process::with_priority("B", "red", 0, 3, 5);
        process.open_slice(0);
        process.run_tick(0);
        process.reset();

        assert_eq!(process.remaining_time(), 3);
        assert_eq!(process.start_time(), None);
        assert!(process.slices().is_empty());
        assert!(!process.is_completed());
    }
}
