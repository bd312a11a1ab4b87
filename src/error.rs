// src/error.rs
use thiserror::Error;

/// Failures the projection engine recovers from locally. None of these
/// ever reach the transport layer as an error response; they steer the
/// fallback chain instead.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// Fewer than two closing prices, so not a single return observation.
    #[error("insufficient history: {0} closing prices")]
    InsufficientData(usize),

    /// The market data collaborator was unreachable, timed out, or
    /// returned an empty series.
    #[error("market data fetch failed: {0}")]
    FetchFailure(String),

    /// Anything unexpected during estimation or simulation. Caught at the
    /// orchestrator boundary and converted into the deterministic
    /// fallback.
    #[error("computation failed: {0}")]
    Computation(String),
}

impl From<reqwest::Error> for ProjectionError {
    fn from(err: reqwest::Error) -> Self {
        ProjectionError::FetchFailure(err.to_string())
    }
}
