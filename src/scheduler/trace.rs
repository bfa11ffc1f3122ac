use super::{Process, Ticks};
use serde::Serialize;

/// A contiguous `[start, end)` run of one process on the processor.
///
/// `end` stays `None` while the process is still holding the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub start: Ticks,
    pub end: Option<Ticks>,
}

impl Slice {
    pub fn open(start: Ticks) -> Self {
        Self { start, end: None }
    }

    pub fn closed(start: Ticks, end: Ticks) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub(crate) fn close(&mut self, end: Ticks) {
        debug_assert!(end > self.start, "empty slice [{}, {end})", self.start);
        self.end = Some(end);
    }

    /// Length of a closed slice; open slices count as zero.
    pub fn len(&self) -> Ticks {
        self.end.map_or(0, |end| end - self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, tick: Ticks) -> bool {
        tick >= self.start && self.end.map_or(true, |end| tick < end)
    }
}

/// One tick of processor time given to the process at index `process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub process: usize,
    pub start: Ticks,
    pub end: Ticks,
}

/// A run of the same process across consecutive trace entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub process: usize,
    pub start: Ticks,
    pub end: Ticks,
}

/// Flat, time-ordered record of every non-idle tick.
#[derive(Debug, Default, Clone)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, process: usize, tick: Ticks) {
        debug_assert!(
            self.entries.last().map_or(true, |last| last.start < tick),
            "trace entries must be appended in tick order"
        );
        self.entries.push(TraceEntry {
            process,
            start: tick,
            end: tick + 1,
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Process index holding the processor during `tick`, or `None` if it was idle.
    pub fn running_at(&self, tick: Ticks) -> Option<usize> {
        self.entries
            .binary_search_by_key(&tick, |entry| entry.start)
            .ok()
            .map(|index| self.entries[index].process)
    }

    /// End of the last non-idle tick.
    pub fn end(&self) -> Ticks {
        self.entries.last().map_or(0, |entry| entry.end)
    }

    /// Total ticks given to the process at index `process`.
    pub fn busy_ticks(&self, process: usize) -> Ticks {
        self.entries
            .iter()
            .filter(|entry| entry.process == process)
            .count() as Ticks
    }

    /// Merges adjacent entries of the same process into spans, ordered by start time.
    pub fn coalesced(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();
        for entry in &self.entries {
            match spans.last_mut() {
                Some(span) if span.process == entry.process && span.end == entry.start => {
                    span.end = entry.end;
                }
                _ => spans.push(Span {
                    process: entry.process,
                    start: entry.start,
                    end: entry.end,
                }),
            }
        }
        spans
    }
}

/// Every closed slice of every process, as spans sorted by start time.
pub fn slice_spans(processes: &[Process]) -> Vec<Span> {
    let mut spans: Vec<Span> = processes
        .iter()
        .enumerate()
        .flat_map(|(process, record)| {
            record.slices().iter().filter_map(move |slice| {
                slice.end.map(|end| Span {
                    process,
                    start: slice.start,
                    end,
                })
            })
        })
        .collect();
    spans.sort_by_key(|span| span.start);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace_of(ticks: &[(usize, Ticks)]) -> Trace {
        let mut trace = Trace::new();
        for &(process, tick) in ticks {
            trace.record(process, tick);
        }
        trace
    }

    #[test]
    fn coalesces_adjacent_ticks_of_same_process() {
        let trace = trace_of(&[(0, 0), (0, 1), (1, 2), (0, 4)]);

        assert_eq!(
            trace.coalesced(),
            vec![
                Span { process: 0, start: 0, end: 2 },
                Span { process: 1, start: 2, end: 3 },
                Span { process: 0, start: 4, end: 5 },
            ]
        );
    }

    #[test]
    fn running_at_reports_idle_gaps() {
        let trace = trace_of(&[(0, 0), (1, 2)]);

        assert_eq!(trace.running_at(0), Some(0));
        assert_eq!(trace.running_at(1), None);
        assert_eq!(trace.running_at(2), Some(1));
        assert_eq!(trace.end(), 3);
        assert_eq!(trace.busy_ticks(0), 1);
    }

    #[test]
    fn open_slice_has_no_length() {
        let slice = Slice::open(4);
        assert!(slice.is_open());
        assert_eq!(slice.len(), 0);
        assert!(slice.contains(100));
        assert!(!Slice::closed(1, 3).contains(3));
    }
}
