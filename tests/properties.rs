use cpu_sched::{
    scheduler::{slice_spans, Ticks},
    Policy, Process, Report, Simulation,
};
use proptest::prelude::*;

fn arb_processes() -> impl Strategy<Value = Vec<Process>> {
    prop::collection::vec((0u64..12, 1u64..7, -3i32..4), 0..8).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (arrival, duration, priority))| {
                Process::with_priority(&format!("p{index}"), "gray", arrival, duration, priority)
            })
            .collect()
    })
}

fn arb_policy() -> impl Strategy<Value = Policy> {
    prop_oneof![
        Just(("FIFO", 0i64)),
        Just(("SRTF", 0i64)),
        (-1i64..4).prop_map(|quantum| ("PRIOP", quantum)),
        (1i64..5).prop_map(|quantum| ("RR", quantum)),
    ]
    .prop_map(|(name, quantum)| Policy::from_name(name, quantum).unwrap())
}

proptest! {
    #[test]
    fn every_run_respects_the_processor_invariants(
        processes in arb_processes(),
        policy in arb_policy()
    ) {
        let policy_name = policy.name();
        let max_arrival = processes.iter().map(Process::arrival_time).max().unwrap_or(0);
        let total_work: Ticks = processes.iter().map(Process::duration).sum();

        let mut simulation = Simulation::new(processes, policy).unwrap();
        simulation.run();

        prop_assert!(simulation.is_done(), "{policy_name} did not finish");
        prop_assert!(simulation.now() <= max_arrival + total_work);

        for (index, process) in simulation.processes().iter().enumerate() {
            prop_assert!(process.is_completed());
            prop_assert_eq!(process.remaining_time(), 0);

            // Conservation: the slices add up to exactly the work requested.
            let slices = process.slices();
            let served: Ticks = slices.iter().map(|slice| slice.len()).sum();
            prop_assert_eq!(served, process.duration());
            prop_assert_eq!(simulation.trace().busy_ticks(index), process.duration());

            prop_assert!(slices.iter().all(|slice| !slice.is_open()));
            prop_assert!(slices[0].start >= process.arrival_time());
            prop_assert_eq!(process.start_time(), Some(slices[0].start));
            prop_assert_eq!(process.finish_time(), slices.last().unwrap().end);
        }

        // No two slices ever share a tick.
        let spans = slice_spans(simulation.processes());
        for pair in spans.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
        prop_assert_eq!(spans, simulation.trace().coalesced());
    }

    #[test]
    fn fifo_never_splits_a_process(processes in arb_processes()) {
        let mut simulation =
            Simulation::new(processes, Policy::from_name("FIFO", 0).unwrap()).unwrap();
        simulation.run();

        for process in simulation.processes() {
            prop_assert_eq!(process.slices().len(), 1);
        }
    }

    #[test]
    fn statistics_are_a_pure_function_of_final_state(
        processes in arb_processes(),
        policy in arb_policy()
    ) {
        let mut simulation = Simulation::new(processes, policy).unwrap();
        simulation.run();

        let first = Report::from_processes(simulation.processes());
        let second = Report::from_processes(simulation.processes());
        prop_assert_eq!(&first, &second);

        for stats in &first.processes {
            prop_assert_eq!(stats.turnaround_time, stats.finish_time - stats.arrival_time);
            prop_assert_eq!(stats.waiting_time, stats.turnaround_time - stats.duration);
        }
    }
}
