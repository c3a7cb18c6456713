//! Harness runner: goal in, verified plan report out.
//!
//! The runner wires the satellite domain into the generic engine and checks
//! the result with the kernel's own replay. It does not apply actions or
//! evaluate preconditions itself.
//!
//! # Pipeline
//!
//! ```text
//! validate_goal() → method_registry(choice_policy)
//!   → plan(achieve(goal)) → replay_verify() → digests → PlanReportV1
//! ```

use std::sync::Arc;

use tracing::{info, info_span};

use skyplan_kernel::carrier::compile::{compile, validate_goal, ProblemError, ProblemV1};
use skyplan_kernel::carrier::goal::Goal;
use skyplan_kernel::carrier::world_state::WorldState;
use skyplan_kernel::error::StructuralError;
use skyplan_kernel::operators::action::Action;
use skyplan_kernel::operators::operator_registry::RegistryError;
use skyplan_kernel::proof::canon::{canonical_json_bytes, CanonError};
use skyplan_kernel::proof::digest::{plan_digest, state_fingerprint};
use skyplan_kernel::proof::hash::ContentHash;
use skyplan_kernel::proof::replay::{replay_verify, ReplayVerdict};
use skyplan_search::contract::TaskV1;
use skyplan_search::engine::{plan, SearchOutcomeV1, SearchStatsV1};
use skyplan_search::error::SearchError;
use skyplan_search::method::MethodRegistryError;
use skyplan_search::trace::RefinementTraceV1;

use crate::config::PlannerConfig;
use crate::worlds::satellite::methods::method_registry;
use crate::worlds::satellite::{SatTask, SatelliteDomain};

/// Error during a planner run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Every alternative for the root task failed.
    #[error(
        "no plan achieves the goal ({} method attempts, {} backtracks)",
        .stats.method_attempts,
        .stats.backtracks
    )]
    PlanInfeasible { stats: SearchStatsV1 },

    /// The problem or goal failed validation.
    #[error(transparent)]
    Problem(#[from] ProblemError),

    /// A static table needed during planning is missing an entry.
    #[error("structural fault at {task}: {source}")]
    Structural {
        task: String,
        #[source]
        source: StructuralError,
    },

    /// Any other fatal engine error (budgets, policy).
    #[error(transparent)]
    Search(SearchError),

    #[error(transparent)]
    Methods(#[from] MethodRegistryError),

    /// The found plan did not survive replay.
    #[error("plan failed replay verification: {detail}")]
    ReplayDivergence { detail: String },

    #[error("report canonicalization failed: {detail}")]
    Canon { detail: String },

    /// The action registry could not be digested.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<SearchError> for RunError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::Structural { task, source } => match source.downcast::<StructuralError>() {
                Ok(fault) => Self::Structural {
                    task,
                    source: *fault,
                },
                Err(source) => Self::Search(SearchError::Structural { task, source }),
            },
            other => Self::Search(other),
        }
    }
}

impl From<CanonError> for RunError {
    fn from(error: CanonError) -> Self {
        Self::Canon {
            detail: error.to_string(),
        }
    }
}

/// Everything a caller learns from one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReportV1 {
    pub plan: Vec<Action>,
    pub final_state: WorldState,
    pub stats: SearchStatsV1,
    pub final_state_fingerprint: ContentHash,
    pub plan_digest: ContentHash,
    pub registry_digest: ContentHash,
    pub policy_digest: ContentHash,
    pub config_digest: ContentHash,
    /// Present iff the search policy records traces.
    pub trace: Option<RefinementTraceV1>,
    /// Whether the plan was replay-verified before reporting.
    pub verified: bool,
}

impl PlanReportV1 {
    #[must_use]
    pub fn plan_len(&self) -> usize {
        self.plan.len()
    }

    #[must_use]
    pub fn fuel_used(&self) -> u64 {
        self.final_state.fuel_used()
    }

    #[must_use]
    pub fn data_stored(&self) -> u64 {
        self.final_state.data_stored()
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if the trace digest cannot be computed.
    pub fn to_json(&self) -> Result<serde_json::Value, CanonError> {
        let trace_digest = match &self.trace {
            Some(trace) => serde_json::Value::String(trace.digest()?.as_str().to_string()),
            None => serde_json::Value::Null,
        };
        Ok(serde_json::json!({
            "config_digest": self.config_digest.as_str(),
            "data_stored": self.data_stored(),
            "final_state_fingerprint": self.final_state_fingerprint.as_str(),
            "fuel_used": self.fuel_used(),
            "plan": self.plan.iter().map(Action::to_json).collect::<Vec<_>>(),
            "plan_digest": self.plan_digest.as_str(),
            "plan_len": self.plan_len() as u64,
            "policy_digest": self.policy_digest.as_str(),
            "registry_digest": self.registry_digest.as_str(),
            "schema_version": "plan_report.v1",
            "stats": self.stats.to_json(),
            "trace_digest": trace_digest,
            "verified": self.verified,
        }))
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json()?)
    }
}

/// Plan for `goal` from `state`.
///
/// # Errors
///
/// - [`RunError::Problem`] if the goal names identifiers the state lacks
/// - [`RunError::PlanInfeasible`] if every alternative fails
/// - [`RunError::Structural`] if a needed table entry is missing
/// - [`RunError::Search`] on an invalid policy or exhausted budget
/// - [`RunError::ReplayDivergence`] if verification is on and replay
///   disagrees with the search
pub fn achieve(state: &WorldState, goal: &Goal, config: &PlannerConfig) -> Result<PlanReportV1, RunError> {
    let span = info_span!("achieve", choice_policy = config.choice_policy.as_str());
    let _entered = span.enter();

    validate_goal(state.tables(), goal)?;
    let domain = SatelliteDomain::new();
    let methods = method_registry(config.choice_policy)?;
    let policy = config.search_policy();
    let goal = Arc::new(goal.clone());

    let result = plan(
        &domain,
        &methods,
        state,
        vec![TaskV1::Compound(SatTask::Achieve(Arc::clone(&goal)))],
        &policy,
    )?;

    let (plan, final_state) = match result.outcome {
        SearchOutcomeV1::Found { plan, final_state } => (plan, final_state),
        SearchOutcomeV1::NoPlan => {
            info!(
                method_attempts = result.stats.method_attempts,
                backtracks = result.stats.backtracks,
                "no plan"
            );
            return Err(RunError::PlanInfeasible { stats: result.stats });
        }
    };

    if config.verify_plan {
        verify(state, &goal, &plan, &final_state, &domain)?;
    }

    let report = PlanReportV1 {
        final_state_fingerprint: state_fingerprint(&final_state)?,
        plan_digest: plan_digest(&plan)?,
        registry_digest: domain.registry().digest()?,
        policy_digest: policy.digest()?,
        config_digest: config.digest()?,
        plan,
        final_state,
        stats: result.stats,
        trace: result.trace,
        verified: config.verify_plan,
    };
    info!(
        plan_len = report.plan_len(),
        fuel_used = report.fuel_used(),
        data_stored = report.data_stored(),
        method_attempts = report.stats.method_attempts,
        backtracks = report.stats.backtracks,
        "plan found"
    );
    Ok(report)
}

/// Compile `problem` and plan for its goal.
///
/// # Errors
///
/// [`RunError::Problem`] if compilation fails, otherwise as [`achieve`].
pub fn run_problem(problem: &ProblemV1, config: &PlannerConfig) -> Result<PlanReportV1, RunError> {
    let compiled = compile(problem)?;
    achieve(&compiled.state, &compiled.goal, config)
}

fn verify(
    initial: &WorldState,
    goal: &Goal,
    plan: &[Action],
    searched: &WorldState,
    domain: &SatelliteDomain,
) -> Result<(), RunError> {
    match replay_verify(initial, goal, plan, domain.registry()) {
        ReplayVerdict::Satisfied { final_state } if final_state == *searched => Ok(()),
        ReplayVerdict::Satisfied { .. } => Err(RunError::ReplayDivergence {
            detail: "replayed final state differs from the searched one".into(),
        }),
        ReplayVerdict::StepRejected { index, failure } => Err(RunError::ReplayDivergence {
            detail: format!("step {index} rejected: {failure}"),
        }),
        ReplayVerdict::GoalNotMet {
            missing_images,
            mispointed,
        } => Err(RunError::ReplayDivergence {
            detail: format!(
                "goal not met: {} images missing, {} satellites mispointed",
                missing_images.len(),
                mispointed.len()
            ),
        }),
    }
}
