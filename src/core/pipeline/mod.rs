//! The assessment pipeline: two risk analyzers running concurrently, joined
//! before a summarizer produces the user-facing answer.

mod executor;
pub mod stages;
pub mod types;

pub use executor::{AssessmentOutcome, Pipeline, PipelineFailure};
pub use types::{PipelineError, RunState, SessionState};

/// Per-request run state machine. Terminal states absorb; `Failed` is
/// reachable from every non-terminal state.
pub fn can_transition(from: RunState, to: RunState) -> bool {
    if from == to {
        return true;
    }
    match from {
        RunState::Created => matches!(to, RunState::ParallelRunning | RunState::Failed),
        RunState::ParallelRunning => matches!(to, RunState::ParallelJoined | RunState::Failed),
        RunState::ParallelJoined => matches!(to, RunState::Summarizing | RunState::Failed),
        RunState::Summarizing => matches!(to, RunState::Complete | RunState::Failed),
        RunState::Complete | RunState::Failed => false,
    }
}

#[cfg(test)]
mod tests;
