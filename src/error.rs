//! Error types for kentro.

use thiserror::Error;

/// Post-condition violations detected by the final validation pass.
///
/// These indicate the numerics drifted into an invalid state; the expected
/// response is to retry with a different seed or flag the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    /// Fewer centers were produced than requested.
    #[error("not enough centers")]
    NotEnoughCenters,

    /// A center coordinate is NaN.
    #[error("NaN detected")]
    Nan,

    /// A center coordinate is infinite.
    #[error("infinite value detected")]
    Infinite,

    /// Two centers are byte-identical.
    #[error("duplicate centers detected")]
    Duplicate,

    /// A center has zero norm under the index-level norm function.
    #[error("zero norm detected")]
    ZeroNorm,
}

/// Errors that can occur during centroid training.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    /// Scratch memory required for training exceeds the configured budget.
    #[error("memory required is {required_mb} MB, memory budget is {budget_mb} MB")]
    BudgetExceeded { required_mb: usize, budget_mb: usize },

    /// `numCenters²` would overflow the 32-bit signed arithmetic used for
    /// bounds-matrix indexing.
    #[error("center-pair indexing overflow detected")]
    DimensionOverflow,

    /// Input containers have an unsupported shape or element layout.
    #[error("unsupported vector layout: {0}")]
    UnsupportedType(String),

    /// Finished centers failed validation.
    #[error("post-condition violated: {0}")]
    PostconditionViolated(Violation),

    /// Training was cancelled cooperatively.
    #[error("training cancelled")]
    Cancelled,
}

/// Result type alias for kentro operations.
pub type Result<T> = std::result::Result<T, TrainError>;
