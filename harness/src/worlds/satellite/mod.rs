//! Satellite-imaging planning domain.
//!
//! Plugs the kernel's `WorldState` and `Action` into the generic engine.
//! Primitive application is delegated to `skyplan_kernel::operators::apply`
//! so that the planner and [`replay_verify`] share one set of preconditions.
//!
//! [`replay_verify`]: skyplan_kernel::proof::replay::replay_verify

pub mod fixtures;
pub mod methods;
pub mod tasks;

use skyplan_kernel::carrier::world_state::WorldState;
use skyplan_kernel::error::StructuralError;
use skyplan_kernel::operators::action::Action;
use skyplan_kernel::operators::apply::{apply, ApplyFailure};
use skyplan_kernel::operators::operator_registry::{kernel_action_registry, ActionRegistryV1};
use skyplan_search::contract::{ApplyOutcomeV1, PlanningDomainV1};

pub use tasks::SatTask;

pub const DOMAIN_ID: &str = "satellite";

/// The satellite domain over a fixed action registry.
#[derive(Debug, Clone)]
pub struct SatelliteDomain {
    registry: ActionRegistryV1,
}

impl SatelliteDomain {
    /// Domain over the kernel's five actions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(kernel_action_registry())
    }

    #[must_use]
    pub fn with_registry(registry: ActionRegistryV1) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &ActionRegistryV1 {
        &self.registry
    }
}

impl Default for SatelliteDomain {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanningDomainV1 for SatelliteDomain {
    type State = WorldState;
    type Action = Action;
    type Task = SatTask;
    type Fault = StructuralError;

    #[allow(clippy::unnecessary_literal_bound)]
    fn domain_id(&self) -> &str {
        DOMAIN_ID
    }

    fn task_name(&self, task: &SatTask) -> &'static str {
        task.name()
    }

    fn apply(&self, state: &mut WorldState, action: &Action) -> Result<ApplyOutcomeV1, StructuralError> {
        match apply(state, action, &self.registry) {
            Ok(_) => Ok(ApplyOutcomeV1::Applied),
            Err(ApplyFailure::Structural(fault)) => Err(fault),
            // An action the registry does not declare rules out the branch
            // like any other unmet precondition.
            Err(failure @ (ApplyFailure::PreconditionNotMet { .. } | ApplyFailure::UnknownAction { .. })) => {
                Ok(ApplyOutcomeV1::Rejected {
                    detail: failure.to_string(),
                })
            }
        }
    }
}
