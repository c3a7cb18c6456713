//! Typed search errors.
//!
//! `SearchError` is fatal. Branch failures (a method that does not apply, a
//! rejected primitive action) never surface here: the engine backtracks on
//! them, and exhausting every alternative is reported as
//! [`crate::engine::SearchOutcomeV1::NoPlan`], not as an error.

use crate::method::MethodRegistryError;

/// Typed fatal failure of a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The policy was rejected before search began.
    #[error("invalid search policy: {detail}")]
    InvalidPolicy { detail: String },

    /// A compound task has no registered methods.
    #[error("no methods declared for task {task}")]
    UnknownTask { task: String },

    /// Refinement nesting reached `max_depth`.
    #[error("refinement depth {depth} reached max_depth {limit}")]
    DepthLimitExceeded { depth: u32, limit: u32 },

    /// `max_method_attempts` method attempts were made without a result.
    #[error("method attempt budget of {limit} exhausted")]
    MethodBudgetExhausted { limit: u64 },

    /// The domain reported a fatal fault while refining or applying `task`.
    #[error("structural fault at {task}: {source}")]
    Structural {
        task: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Registry(#[from] MethodRegistryError),
}
