use super::{Process, Slice, Ticks};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessStats {
    pub id: String,
    pub arrival_time: Ticks,
    pub duration: Ticks,
    pub start_time: Ticks,
    pub finish_time: Ticks,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
    pub response_time: Ticks,
    /// The bars this process contributes to the Gantt chart.
    pub slices: Vec<Slice>,
}

impl ProcessStats {
    /// Derives the statistics of a finished process from its slices alone.
    ///
    /// Returns `None` if the process never ran to completion.
    pub fn from_process(process: &Process) -> Option<Self> {
        if !process.is_completed() {
            return None;
        }
        let start_time = process.slices().first()?.start;
        let finish_time = process.slices().last()?.end?;

        let turnaround_time = finish_time - process.arrival_time();
        Some(Self {
            id: process.id().to_owned(),
            arrival_time: process.arrival_time(),
            duration: process.duration(),
            start_time,
            finish_time,
            waiting_time: turnaround_time.saturating_sub(process.duration()),
            turnaround_time,
            response_time: start_time - process.arrival_time(),
            slices: process.slices().to_vec(),
        })
    }
}

/// Per-process and mean statistics of a run.
///
/// Means are `None` when no process completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub processes: Vec<ProcessStats>,
    pub mean_waiting_time: Option<f64>,
    pub mean_turnaround_time: Option<f64>,
    pub mean_response_time: Option<f64>,
    pub makespan: Ticks,
}

impl Report {
    pub fn from_processes(processes: &[Process]) -> Self {
        let processes: Vec<ProcessStats> =
            processes.iter().filter_map(ProcessStats::from_process).collect();

        Self {
            mean_waiting_time: mean(&processes, |stats| stats.waiting_time),
            mean_turnaround_time: mean(&processes, |stats| stats.turnaround_time),
            mean_response_time: mean(&processes, |stats| stats.response_time),
            makespan: processes
                .iter()
                .map(|stats| stats.finish_time)
                .max()
                .unwrap_or(0),
            processes,
        }
    }
}

fn mean(stats: &[ProcessStats], field: impl Fn(&ProcessStats) -> Ticks) -> Option<f64> {
    if stats.is_empty() {
        return None;
    }
    let total: Ticks = stats.iter().map(field).sum();
    Some(total as f64 / stats.len() as f64)
}

fn format_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |value| format!("{value:.2}"))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} {:>7} {:>8} {:>6} {:>6} {:>7} {:>10} {:>8}",
            "Process", "Arrival", "Duration", "Start", "Finish", "Waiting", "Turnaround", "Response"
        )?;
        for stats in &self.processes {
            writeln!(
                f,
                "{:<10} {:>7} {:>8} {:>6} {:>6} {:>7} {:>10} {:>8}",
                stats.id,
                stats.arrival_time,
                stats.duration,
                stats.start_time,
                stats.finish_time,
                stats.waiting_time,
                stats.turnaround_time,
                stats.response_time
            )?;
        }
        writeln!(f, "Mean waiting time:    {}", format_mean(self.mean_waiting_time))?;
        writeln!(
            f,
            "Mean turnaround time: {}",
            format_mean(self.mean_turnaround_time)
        )?;
        write!(f, "Mean response time:   {}", format_mean(self.mean_response_time))
    }
}
