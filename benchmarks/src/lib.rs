//! Shared helpers for skyplan benchmark suites.

use std::sync::Arc;

use skyplan_harness::config::PlannerConfig;
use skyplan_harness::worlds::satellite::methods::method_registry;
use skyplan_harness::worlds::satellite::{fixtures, SatTask, SatelliteDomain};
use skyplan_kernel::carrier::compile::{compile, ProblemV1};
use skyplan_kernel::carrier::goal::Goal;
use skyplan_kernel::carrier::world_state::WorldState;
use skyplan_kernel::operators::action::Action;
use skyplan_search::contract::TaskV1;
use skyplan_search::engine::{plan, SearchResultV1};
use skyplan_search::method::MethodRegistryV1;
use skyplan_search::policy::SearchPolicyV1;

/// A named benchmark problem.
pub struct Regime {
    pub name: &'static str,
    pub problem: ProblemV1,
}

/// Problems from a hand-sized scenario up to a 16-satellite fleet.
#[must_use]
pub fn regimes() -> Vec<Regime> {
    vec![
        Regime {
            name: "single_satellite",
            problem: fixtures::single_satellite(),
        },
        Regime {
            name: "two_satellites",
            problem: fixtures::two_satellites(),
        },
        Regime {
            name: "greedy_trap",
            problem: fixtures::greedy_trap(),
        },
        Regime {
            name: "fleet_4x8",
            problem: fixtures::fleet(4, 8),
        },
        Regime {
            name: "fleet_8x16",
            problem: fixtures::fleet(8, 16),
        },
        Regime {
            name: "fleet_16x32",
            problem: fixtures::fleet(16, 32),
        },
    ]
}

/// Prepared inputs for calling `plan()` directly, bypassing `achieve()`
/// validation, replay and digests.
pub struct PlanSetup {
    pub state: WorldState,
    pub goal: Arc<Goal>,
    pub domain: SatelliteDomain,
    pub methods: MethodRegistryV1<SatelliteDomain>,
    pub policy: SearchPolicyV1,
}

/// Compile `problem` and build the engine inputs once.
///
/// # Panics
///
/// Panics if the problem does not compile or the method registry cannot be
/// built. Benchmark setup failures are fatal.
#[must_use]
pub fn prepare_plan_setup(problem: &ProblemV1, config: &PlannerConfig) -> PlanSetup {
    let compiled = compile(problem).expect("benchmark problem compiles");
    PlanSetup {
        state: compiled.state,
        goal: Arc::new(compiled.goal),
        domain: SatelliteDomain::new(),
        methods: method_registry(config.choice_policy).expect("method registry"),
        policy: config.search_policy(),
    }
}

/// Run the engine only.
///
/// # Panics
///
/// Panics on a fatal search error.
#[must_use]
pub fn run_plan_only(setup: &PlanSetup) -> SearchResultV1<WorldState, Action> {
    plan(
        &setup.domain,
        &setup.methods,
        &setup.state,
        vec![TaskV1::Compound(SatTask::Achieve(Arc::clone(&setup.goal)))],
        &setup.policy,
    )
    .expect("search must not fail fatally")
}
