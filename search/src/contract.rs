//! Planning domain contract trait.

use std::fmt;

/// Trait for domains the task-network engine can plan in.
///
/// The engine never inspects states, actions or tasks; it clones states at
/// choice points, hands primitive actions to [`PlanningDomainV1::apply`], and
/// looks up methods for compound tasks by [`PlanningDomainV1::task_name`].
///
/// # Contract
///
/// - `apply` must leave the state untouched when it returns
///   [`ApplyOutcomeV1::Rejected`] or an error.
/// - `apply` and `task_name` must be deterministic.
/// - A `Fault` is fatal: the engine aborts instead of backtracking.
pub trait PlanningDomainV1 {
    /// The mutable world state. Cloned once per choice point.
    type State: Clone;
    /// A ground primitive action.
    type Action: Clone + fmt::Display;
    /// A compound task together with its arguments.
    type Task: Clone + fmt::Display;
    /// Fatal domain error (malformed static data).
    type Fault: std::error::Error + Send + Sync + 'static;

    /// Unique domain identifier (diagnostics and trace headers).
    fn domain_id(&self) -> &str;

    /// The name methods are registered under for `task`.
    fn task_name(&self, task: &Self::Task) -> &'static str;

    /// Apply a primitive action in place.
    ///
    /// # Errors
    ///
    /// Returns `Self::Fault` for a fatal structural problem.
    fn apply(
        &self,
        state: &mut Self::State,
        action: &Self::Action,
    ) -> Result<ApplyOutcomeV1, Self::Fault>;
}

/// An agenda entry: a compound task to refine or a primitive action to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskV1<T, A> {
    Compound(T),
    Primitive(A),
}

impl<T: fmt::Display, A: fmt::Display> fmt::Display for TaskV1<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compound(task) => task.fmt(f),
            Self::Primitive(action) => action.fmt(f),
        }
    }
}

/// Non-fatal outcome of applying a primitive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcomeV1 {
    Applied,
    /// A precondition failed; the branch is abandoned.
    Rejected { detail: String },
}
