//! Builds the cycling order for a switch session.
//!
//! The ordering is: frontmost process first, then descending recency key.
//! The sort is stable so equal candidates keep their enumeration order,
//! which also keeps a process's windows in the order the source gave them.

use crate::candidate::{ProcessEntry, ProcessId, SwitchCandidate, SwitchTarget};
use std::cmp::Ordering;

/// Expand processes into candidates and order them for cycling.
///
/// A process with windows yields one candidate per window. A process without
/// windows yields a single [`SwitchTarget::ProcessOnly`] candidate.
/// An empty input yields an empty output.
#[must_use]
pub fn rank(processes: &[ProcessEntry]) -> Vec<SwitchCandidate> {
    let mut candidates: Vec<SwitchCandidate> = processes
        .iter()
        .flat_map(|process| {
            let targets: Vec<SwitchTarget> = if process.windows.is_empty() {
                vec![SwitchTarget::ProcessOnly]
            } else {
                process
                    .windows
                    .iter()
                    .copied()
                    .map(SwitchTarget::Window)
                    .collect()
            };

            targets.into_iter().map(move |target| SwitchCandidate {
                process_id: process.process_id,
                target,
                title: String::new(),
                is_frontmost: process.is_frontmost,
                recency_key: process.recency_key,
            })
        })
        .collect();

    // slice::sort_by is stable
    candidates.sort_by(compare);
    candidates
}

fn compare(a: &SwitchCandidate, b: &SwitchCandidate) -> Ordering {
    b.is_frontmost
        .cmp(&a.is_frontmost)
        .then_with(|| b.recency_key.cmp(&a.recency_key))
}

/// Index of the first candidate owned by `active`, or 0 when there is none.
#[must_use]
pub fn find_index(candidates: &[SwitchCandidate], active: Option<ProcessId>) -> usize {
    active
        .and_then(|pid| candidates.iter().position(|c| c.process_id == pid))
        .unwrap_or(0)
}

/// The process flagged as frontmost in an enumeration snapshot, if any.
#[must_use]
pub fn frontmost_process(processes: &[ProcessEntry]) -> Option<ProcessId> {
    processes
        .iter()
        .find(|p| p.is_frontmost)
        .map(|p| p.process_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::WindowHandle;

    fn process(pid: i32, frontmost: bool, windows: &[i64]) -> ProcessEntry {
        ProcessEntry {
            process_id: ProcessId(pid),
            is_frontmost: frontmost,
            recency_key: pid as i64,
            windows: windows.iter().copied().map(WindowHandle).collect(),
        }
    }

    fn pids(candidates: &[SwitchCandidate]) -> Vec<i32> {
        candidates.iter().map(|c| c.process_id.0).collect()
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn test_rank_frontmost_first_then_recency_descending() {
        let processes = vec![
            process(100, false, &[1]),
            process(300, false, &[2]),
            process(50, true, &[3]),
            process(200, false, &[4]),
        ];

        let ranked = rank(&processes);
        assert_eq!(pids(&ranked), vec![50, 300, 200, 100]);
        assert!(ranked[0].is_frontmost);
    }

    #[test]
    fn test_rank_windowless_process_yields_one_process_candidate() {
        let ranked = rank(&[process(7, false, &[])]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].target, SwitchTarget::ProcessOnly);
        assert_eq!(ranked[0].window(), None);
    }

    #[test]
    fn test_rank_keeps_window_order_within_process() {
        let ranked = rank(&[process(7, false, &[30, 10, 20])]);
        let windows: Vec<_> = ranked.iter().filter_map(|c| c.window()).collect();
        assert_eq!(
            windows,
            vec![WindowHandle(30), WindowHandle(10), WindowHandle(20)]
        );
    }

    #[test]
    fn test_rank_is_stable_for_equal_keys() {
        let mut a = process(1, false, &[11]);
        let mut b = process(2, false, &[22]);
        a.recency_key = 5;
        b.recency_key = 5;

        let ranked = rank(&[a, b]);
        assert_eq!(pids(&ranked), vec![1, 2]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let processes = vec![
            process(3, false, &[1, 2]),
            process(9, true, &[]),
            process(4, false, &[5]),
        ];
        assert_eq!(rank(&processes), rank(&processes));
    }

    #[test]
    fn test_rank_preserves_partition() {
        let processes = vec![
            process(3, false, &[1, 2, 3]),
            process(9, true, &[]),
            process(4, false, &[5]),
            process(5, false, &[]),
        ];

        let ranked = rank(&processes);
        assert_eq!(ranked.len(), 3 + 1 + 1 + 1);

        let mut windows: Vec<_> = ranked.iter().filter_map(|c| c.window()).collect();
        windows.sort_by_key(|w| w.0);
        assert_eq!(
            windows,
            vec![WindowHandle(1), WindowHandle(2), WindowHandle(3), WindowHandle(5)]
        );

        let mut bare: Vec<_> = ranked
            .iter()
            .filter(|c| c.target == SwitchTarget::ProcessOnly)
            .map(|c| c.process_id.0)
            .collect();
        bare.sort();
        assert_eq!(bare, vec![5, 9]);
    }

    #[test]
    fn test_every_frontmost_precedes_every_other() {
        let processes = vec![
            process(1, false, &[1]),
            process(2, true, &[2, 3]),
            process(900, false, &[4]),
        ];

        let ranked = rank(&processes);
        let last_front = ranked.iter().rposition(|c| c.is_frontmost).unwrap();
        let first_back = ranked.iter().position(|c| !c.is_frontmost).unwrap();
        assert!(last_front < first_back);
    }

    #[test]
    fn test_find_index() {
        let ranked = rank(&[
            process(1, true, &[1]),
            process(3, false, &[2, 3]),
            process(2, false, &[4]),
        ]);

        assert_eq!(find_index(&ranked, Some(ProcessId(1))), 0);
        assert_eq!(find_index(&ranked, Some(ProcessId(3))), 1);
        assert_eq!(find_index(&ranked, Some(ProcessId(2))), 3);
        assert_eq!(find_index(&ranked, Some(ProcessId(99))), 0);
        assert_eq!(find_index(&ranked, None), 0);
        assert_eq!(find_index(&[], Some(ProcessId(1))), 0);
    }

    #[test]
    fn test_frontmost_process() {
        let processes = vec![process(1, false, &[]), process(2, true, &[])];
        assert_eq!(frontmost_process(&processes), Some(ProcessId(2)));
        assert_eq!(frontmost_process(&processes[..1]), None);
    }
}
