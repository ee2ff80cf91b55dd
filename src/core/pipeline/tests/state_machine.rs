use crate::core::pipeline::{RunState, can_transition};

#[test]
fn lifecycle_happy_path_transitions_are_allowed() {
    let path = [
        (RunState::Created, RunState::ParallelRunning),
        (RunState::ParallelRunning, RunState::ParallelJoined),
        (RunState::ParallelJoined, RunState::Summarizing),
        (RunState::Summarizing, RunState::Complete),
    ];
    for (from, to) in path {
        assert!(
            can_transition(from, to),
            "expected transition {:?} -> {:?} to be allowed",
            from,
            to
        );
    }
}

#[test]
fn failure_is_reachable_from_every_non_terminal_state() {
    let active = [
        RunState::Created,
        RunState::ParallelRunning,
        RunState::ParallelJoined,
        RunState::Summarizing,
    ];
    for from in active {
        assert!(
            can_transition(from, RunState::Failed),
            "expected failure from {:?}",
            from
        );
    }
}

#[test]
fn terminal_states_absorb() {
    for terminal in [RunState::Complete, RunState::Failed] {
        for to in [
            RunState::Created,
            RunState::ParallelRunning,
            RunState::ParallelJoined,
            RunState::Summarizing,
            RunState::Complete,
            RunState::Failed,
        ] {
            if to == terminal {
                continue;
            }
            assert!(
                !can_transition(terminal, to),
                "terminal {:?} must not reach {:?}",
                terminal,
                to
            );
        }
    }
}

#[test]
fn stages_cannot_be_skipped() {
    assert!(!can_transition(RunState::Created, RunState::ParallelJoined));
    assert!(!can_transition(RunState::Created, RunState::Summarizing));
    assert!(!can_transition(
        RunState::ParallelRunning,
        RunState::Summarizing
    ));
    assert!(!can_transition(RunState::ParallelRunning, RunState::Complete));
    assert!(!can_transition(RunState::ParallelJoined, RunState::Complete));
}

#[test]
fn status_strings_round_trip() {
    for state in [
        RunState::Created,
        RunState::ParallelRunning,
        RunState::ParallelJoined,
        RunState::Summarizing,
        RunState::Complete,
        RunState::Failed,
    ] {
        assert_eq!(RunState::from_status(state.as_str()), Some(state));
    }
    assert_eq!(RunState::from_status("bogus"), None);
}
