//! Error types for controller steps.

use thiserror::Error;

/// Result type for controller operations.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Structural failures surfaced to the host when a step cannot run.
///
/// A step that returns one of these has not mutated any controller state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// A required input key was absent from the step inputs.
    #[error("missing input `{key}`")]
    MissingInput { key: String },

    /// The connection snapshot does not have the expected shape.
    #[error("malformed connection snapshot: {reason}")]
    MalformedSnapshot { reason: String },

    /// `time + time_step_size` does not fit in a `u64`.
    #[error("next step time overflows: {time} + {step}")]
    TimeOverflow { time: u64, step: u64 },
}

impl ControllerError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            reason: reason.into(),
        }
    }
}

/// Failures while replaying a scenario through a controller.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The controller rejected a step.
    #[error("step at t={time} failed: {source}")]
    Step {
        time: u64,
        #[source]
        source: ControllerError,
    },

    /// A snapshot could not be encoded as host input.
    #[error("cannot encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// The controller asked for a next time that does not move forward.
    #[error("controller stalled at t={time} (next={next})")]
    Stalled { time: u64, next: u64 },
}
