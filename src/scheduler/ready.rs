use super::{Process, Ticks};

/// Indices of the processes that have arrived by `tick` and still have work left, in
/// declaration order.
pub fn ready_set(processes: &[Process], tick: Ticks) -> Vec<usize> {
    processes
        .iter()
        .enumerate()
        .filter(|(_, process)| process.is_ready_at(tick))
        .map(|(index, _)| index)
        .collect()
}

/// Indices of the processes whose arrival is exactly `tick`, in declaration order.
pub fn arrivals_at(processes: &[Process], tick: Ticks) -> impl Iterator<Item = usize> + '_ {
    processes
        .iter()
        .enumerate()
        .filter(move |(_, process)| process.arrival_time() == tick && !process.is_completed())
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_by_arrival_in_declaration_order() {
        let processes = vec![
            Process::new("late", 5, 1),
            Process::new("a", 0, 1),
            Process::new("b", 2, 1),
        ];

        assert_eq!(ready_set(&processes, 0), vec![1]);
        assert_eq!(ready_set(&processes, 2), vec![1, 2]);
        assert_eq!(ready_set(&processes, 5), vec![0, 1, 2]);
        assert_eq!(ready_set(&processes, 5), ready_set(&processes, 5));
        assert_eq!(arrivals_at(&processes, 2).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn excludes_completed_processes() {
        let mut processes = vec![Process::new("a", 0, 1), Process::new("b", 0, 1)];
        processes[0].open_slice(0);
        processes[0].run_tick(0);

        assert_eq!(ready_set(&processes, 1), vec![1]);
    }
}
