//! Property-based tests over randomly generated problems.
//!
//! Generated problems always carry complete `slew_time` and `data` tables,
//! so the only admissible failure is an infeasible goal.

use std::collections::BTreeMap;

use proptest::prelude::*;

use skyplan_harness::config::{ChoicePolicy, PlannerConfig};
use skyplan_harness::runner::{achieve, run_problem, RunError};
use skyplan_kernel::carrier::compile::{
    compile, DataEntryV1, GoalSpecV1, ImageSpecV1, InstrumentSpecV1, PointingGoalV1, ProblemV1, SatelliteSpecV1,
    SlewEntryV1,
};
use skyplan_kernel::carrier::ids::Image;
use skyplan_kernel::carrier::world_state::WorldState;
use skyplan_kernel::cost::feasibility::analyze;
use skyplan_kernel::operators::action::Action;
use skyplan_kernel::operators::operator_registry::kernel_action_registry;
use skyplan_kernel::proof::replay::{replay_verify, ReplayVerdict};

#[derive(Debug, Clone)]
struct SatelliteDraw {
    pointing: usize,
    fuel: u64,
    capacity: u64,
    /// (mode bitmask, calibration target) per instrument.
    instruments: Vec<(u8, usize)>,
    final_pointing: Option<usize>,
}

#[derive(Debug, Clone)]
struct ProblemDraw {
    directions: usize,
    modes: usize,
    satellites: Vec<SatelliteDraw>,
    slew_costs: Vec<u64>,
    sizes: Vec<u64>,
    wanted: Vec<bool>,
    held: Vec<bool>,
}

fn satellite_draw(directions: usize, modes: usize) -> impl Strategy<Value = SatelliteDraw> {
    let full_mask = (1u8 << modes) - 1;
    (
        0..directions,
        0u64..=30,
        0u64..=8,
        prop::collection::vec((1u8..=full_mask, 0..directions), 1..=2),
        prop::option::of(0..directions),
    )
        .prop_map(|(pointing, fuel, capacity, instruments, final_pointing)| SatelliteDraw {
            pointing,
            fuel,
            capacity,
            instruments,
            final_pointing,
        })
}

fn problem_draw() -> impl Strategy<Value = ProblemDraw> {
    (2usize..=4, 1usize..=2, 1usize..=3).prop_flat_map(|(directions, modes, satellites)| {
        let pairs = directions * (directions - 1) / 2;
        let images = directions * modes;
        (
            prop::collection::vec(satellite_draw(directions, modes), satellites),
            prop::collection::vec(1u64..=6, pairs),
            prop::collection::vec(1u64..=4, images),
            prop::collection::vec(prop::bool::weighted(0.3), images),
            prop::collection::vec(prop::bool::weighted(0.1), images),
        )
            .prop_map(move |(satellites, slew_costs, sizes, wanted, held)| ProblemDraw {
                directions,
                modes,
                satellites,
                slew_costs,
                sizes,
                wanted,
                held,
            })
    })
}

fn build(draw: &ProblemDraw) -> ProblemV1 {
    let direction = |d: usize| format!("d{d}");
    let mode = |m: usize| format!("m{m}");

    let mut slew_time = Vec::new();
    let mut costs = draw.slew_costs.iter();
    for from in 0..draw.directions {
        for to in from + 1..draw.directions {
            slew_time.push(SlewEntryV1 {
                from: direction(from),
                to: direction(to),
                cost: *costs.next().unwrap(),
            });
        }
    }

    let mut data = Vec::new();
    let mut wanted = Vec::new();
    let mut held = Vec::new();
    for d in 0..draw.directions {
        for m in 0..draw.modes {
            let index = d * draw.modes + m;
            data.push(DataEntryV1 {
                direction: direction(d),
                mode: mode(m),
                size: draw.sizes[index],
            });
            let spec = ImageSpecV1 {
                direction: direction(d),
                mode: mode(m),
            };
            if draw.held[index] {
                held.push(spec.clone());
            }
            if draw.wanted[index] {
                wanted.push(spec);
            }
        }
    }

    let mut satellites = Vec::new();
    let mut pointing = Vec::new();
    for (j, sat) in draw.satellites.iter().enumerate() {
        let name = format!("s{j}");
        let instruments = sat
            .instruments
            .iter()
            .enumerate()
            .map(|(k, (mask, target))| InstrumentSpecV1 {
                name: format!("s{j}i{k}"),
                supports: (0..draw.modes).filter(|m| mask & (1 << m) != 0).map(mode).collect(),
                calibration_target: direction(*target),
                calibrated: false,
            })
            .collect();
        if let Some(d) = sat.final_pointing {
            pointing.push(PointingGoalV1 {
                satellite: name.clone(),
                direction: direction(d),
            });
        }
        satellites.push(SatelliteSpecV1 {
            name,
            pointing: direction(sat.pointing),
            fuel: sat.fuel,
            data_capacity: sat.capacity,
            instruments,
            powered: None,
        });
    }

    ProblemV1 {
        directions: (0..draw.directions).map(direction).collect(),
        modes: (0..draw.modes).map(mode).collect(),
        satellites,
        slew_time,
        data,
        have_image: held,
        goal: GoalSpecV1 {
            pointing,
            have_image: wanted,
        },
    }
}

/// Every instrument supports every mode and no satellite is short of fuel
/// or capacity.
fn generous(mut draw: ProblemDraw) -> ProblemDraw {
    let full_mask = (1u8 << draw.modes) - 1;
    for sat in &mut draw.satellites {
        sat.fuel = 1_000;
        sat.capacity = 1_000;
        for instrument in &mut sat.instruments {
            instrument.0 = full_mask;
        }
    }
    draw
}

fn totals(state: &WorldState) -> (u64, u64) {
    state.tables().satellites().iter().fold((0, 0), |(fuel, data), sat| {
        (
            fuel + state.fuel(sat).unwrap_or(0),
            data + state.data_capacity(sat).unwrap_or(0),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// A found plan replays, reaches the goal, and accounts for every unit
    /// of fuel and capacity it spends.
    #[test]
    fn found_plans_replay_and_conserve_resources(draw in problem_draw()) {
        let problem = build(&draw);
        let compiled = compile(&problem).unwrap();
        match run_problem(&problem, &PlannerConfig::default()) {
            Ok(report) => {
                let verdict = replay_verify(&compiled.state, &compiled.goal, &report.plan, &kernel_action_registry());
                let ReplayVerdict::Satisfied { final_state } = verdict else {
                    return Err(TestCaseError::fail(format!("replay failed: {verdict:?}")));
                };
                prop_assert_eq!(&final_state, &report.final_state);

                let (fuel_before, capacity_before) = totals(&compiled.state);
                let (fuel_after, capacity_after) = totals(&final_state);
                prop_assert_eq!(fuel_before - fuel_after, report.fuel_used());
                prop_assert_eq!(capacity_before - capacity_after, report.data_stored());

                for image in compiled.state.images() {
                    prop_assert!(final_state.has_image(image), "lost {}", image);
                }
                let mut taken: BTreeMap<Image, usize> = BTreeMap::new();
                for action in &report.plan {
                    if let Action::TakeImage { direction, mode, .. } = action {
                        let image = Image::new(direction.clone(), mode.clone());
                        prop_assert!(!compiled.state.has_image(&image), "retook held {}", image);
                        *taken.entry(image).or_default() += 1;
                    }
                }
                prop_assert!(taken.values().all(|&n| n == 1), "image taken twice: {taken:?}");
            }
            Err(RunError::PlanInfeasible { .. }) => {}
            Err(other) => return Err(TestCaseError::fail(format!("unexpected error: {other}"))),
        }
    }

    /// With ample fuel and capacity and universal instruments, every goal
    /// is feasible and the planner finds a plan.
    #[test]
    fn feasible_goals_are_always_planned(draw in problem_draw()) {
        let problem = build(&generous(draw));
        let compiled = compile(&problem).unwrap();
        let analysis = analyze(&compiled.state, &compiled.goal).unwrap();
        prop_assert!(analysis.unachievable_images().is_empty());

        let report = run_problem(&problem, &PlannerConfig::default());
        prop_assert!(report.is_ok(), "no plan: {:?}", report.err().map(|e| e.to_string()));
    }

    /// A goal pointing out of reach from the initial state is reported as
    /// infeasible before any image is chosen.
    #[test]
    fn unreachable_pointings_fail_without_search(draw in problem_draw()) {
        let problem = build(&draw);
        let compiled = compile(&problem).unwrap();
        let analysis = analyze(&compiled.state, &compiled.goal).unwrap();
        if !analysis.unreachable_pointings().is_empty() {
            match run_problem(&problem, &PlannerConfig::default()) {
                Err(RunError::PlanInfeasible { stats }) => prop_assert_eq!(stats.method_attempts, 1),
                other => {
                    return Err(TestCaseError::fail(format!(
                        "expected PlanInfeasible, got {:?}",
                        other.map(|r| r.plan_len())
                    )));
                }
            }
        }
    }

    /// Replanning from a plan's final state never acts again.
    #[test]
    fn replanning_a_reached_goal_is_empty(draw in problem_draw()) {
        let problem = build(&draw);
        let compiled = compile(&problem).unwrap();
        if let Ok(report) = achieve(&compiled.state, &compiled.goal, &PlannerConfig::default()) {
            let again = achieve(&report.final_state, &compiled.goal, &PlannerConfig::default()).unwrap();
            prop_assert!(again.plan.is_empty());
        }
    }

    /// Identical inputs give byte-identical reports, traces included.
    #[test]
    fn planning_is_deterministic(draw in problem_draw()) {
        let problem = build(&draw);
        for policy in [ChoicePolicy::CheapestThenLastChance, ChoicePolicy::LastChanceThenCheapest] {
            let config = PlannerConfig { choice_policy: policy, ..PlannerConfig::default() };
            let a = run_problem(&problem, &config);
            let b = run_problem(&problem, &config);
            match (a, b) {
                (Ok(a), Ok(b)) => {
                    prop_assert_eq!(a.to_canonical_json_bytes().unwrap(), b.to_canonical_json_bytes().unwrap());
                    prop_assert_eq!(a.trace, b.trace);
                }
                (Err(RunError::PlanInfeasible { stats: a }), Err(RunError::PlanInfeasible { stats: b })) => {
                    prop_assert_eq!(a, b);
                }
                (a, b) => {
                    return Err(TestCaseError::fail(format!(
                        "diverging runs: {:?} vs {:?}",
                        a.map(|r| r.plan_len()).map_err(|e| e.to_string()),
                        b.map(|r| r.plan_len()).map_err(|e| e.to_string()),
                    )));
                }
            }
        }
    }

    /// The feasibility analysis is a pure function of state and goal.
    #[test]
    fn cost_tables_are_deterministic(draw in problem_draw()) {
        let compiled = compile(&build(&draw)).unwrap();
        let a = analyze(&compiled.state, &compiled.goal).unwrap();
        let b = analyze(&compiled.state, &compiled.goal).unwrap();
        prop_assert_eq!(a.to_json(), b.to_json());
        prop_assert_eq!(a, b);
    }
}
