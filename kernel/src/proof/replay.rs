//! `replay_verify()`: verify a plan by deterministic replay.
//!
//! Re-applies every action to a clone of the initial state through the same
//! `apply()` the planner uses, then checks the goal against the final state.
//! Replay is independent of how the plan was produced: any action sequence
//! can be verified.

use crate::carrier::goal::Goal;
use crate::carrier::ids::{Image, SatelliteId};
use crate::carrier::world_state::WorldState;
use crate::operators::action::Action;
use crate::operators::apply::{apply, ApplyFailure};
use crate::operators::operator_registry::ActionRegistryV1;

/// Outcome of replaying a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayVerdict {
    /// Every step applied and the goal holds in the final state.
    Satisfied { final_state: WorldState },
    /// Step `index` could not be applied.
    StepRejected { index: usize, failure: ApplyFailure },
    /// Every step applied but the goal does not hold.
    GoalNotMet {
        missing_images: Vec<Image>,
        mispointed: Vec<SatelliteId>,
    },
}

impl ReplayVerdict {
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }
}

/// Replay `plan` from `initial` and check `goal`.
#[must_use]
pub fn replay_verify(
    initial: &WorldState,
    goal: &Goal,
    plan: &[Action],
    registry: &ActionRegistryV1,
) -> ReplayVerdict {
    let mut state = initial.clone();
    for (index, action) in plan.iter().enumerate() {
        if let Err(failure) = apply(&mut state, action, registry) {
            return ReplayVerdict::StepRejected { index, failure };
        }
    }
    let missing_images = goal.missing_images(&state);
    let mispointed = goal.mispointed(&state);
    if missing_images.is_empty() && mispointed.is_empty() {
        ReplayVerdict::Satisfied { final_state: state }
    } else {
        ReplayVerdict::GoalNotMet {
            missing_images,
            mispointed,
        }
    }
}
