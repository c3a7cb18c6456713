//! End-to-end planning scenarios, checked by independent replay.

use std::path::Path;

use skyplan_harness::config::{ChoicePolicy, PlannerConfig};
use skyplan_harness::runner::{achieve, run_problem, PlanReportV1, RunError};
use skyplan_harness::worlds::satellite::fixtures;
use skyplan_kernel::carrier::compile::{compile, ProblemV1};
use skyplan_kernel::operators::action::Action;
use skyplan_kernel::operators::operator_registry::kernel_action_registry;
use skyplan_kernel::proof::replay::{replay_verify, ReplayVerdict};

fn plan_strings(report: &PlanReportV1) -> Vec<String> {
    report.plan.iter().map(ToString::to_string).collect()
}

/// Replay outside the runner and return the final state.
fn replay(problem: &ProblemV1, report: &PlanReportV1) -> skyplan_kernel::carrier::world_state::WorldState {
    let compiled = compile(problem).unwrap();
    match replay_verify(&compiled.state, &compiled.goal, &report.plan, &kernel_action_registry()) {
        ReplayVerdict::Satisfied { final_state } => final_state,
        other => panic!("replay failed: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Named scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_satellite_cold_start() {
    let problem = fixtures::single_satellite();
    let report = run_problem(&problem, &PlannerConfig::default()).unwrap();
    assert_eq!(
        plan_strings(&report),
        [
            "switch_on(i1, s1)",
            "calibrate(s1, i1, d0)",
            "turn_to(s1, d1, d0)",
            "take_image(s1, d1, i1, m1)",
        ]
    );
    let final_state = replay(&problem, &report);
    assert_eq!(final_state, report.final_state);
    assert_eq!(final_state.fuel(&"s1".into()), Some(7));
    assert_eq!(final_state.data_capacity(&"s1".into()), Some(8));
}

#[test]
fn final_pointing_reserve_rules_out_the_only_taker() {
    let err = run_problem(&fixtures::fuel_starved(), &PlannerConfig::default()).unwrap_err();
    let RunError::PlanInfeasible { stats } = err else {
        panic!("expected PlanInfeasible, got {err}");
    };
    assert_eq!(stats.actions_applied, 0);

    // Without the final pointing, the same fuel suffices.
    let mut relaxed = fixtures::fuel_starved();
    relaxed.goal.pointing.clear();
    assert!(run_problem(&relaxed, &PlannerConfig::default()).is_ok());
}

#[test]
fn two_satellites_cheaper_image_first() {
    let problem = fixtures::two_satellites();
    let report = run_problem(&problem, &PlannerConfig::default()).unwrap();
    let takes: Vec<&Action> = report
        .plan
        .iter()
        .filter(|a| matches!(a, Action::TakeImage { .. }))
        .collect();
    assert_eq!(takes.len(), 2);
    assert_eq!(takes[0].to_string(), "take_image(s2, d2, i2, m2)");
    assert_eq!(takes[1].to_string(), "take_image(s1, d1, i1, m1)");

    // Final repositioning comes last, in goal order.
    let tail: Vec<String> = report.plan[report.plan_len() - 2..].iter().map(ToString::to_string).collect();
    assert_eq!(tail, ["turn_to(s1, d0, d1)", "turn_to(s2, d0, d2)"]);
    replay(&problem, &report);
}

#[test]
fn golden_problem_file_matches_fixture() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures/two_satellites.json");
    let bytes = std::fs::read(path).unwrap();
    let problem = ProblemV1::from_json_slice(&bytes).unwrap();
    assert_eq!(problem, fixtures::two_satellites());
}

// ---------------------------------------------------------------------------
// Idempotence and policy alternatives
// ---------------------------------------------------------------------------

#[test]
fn replanning_from_the_final_state_is_empty() {
    for problem in [fixtures::single_satellite(), fixtures::two_satellites(), fixtures::contested()] {
        let compiled = compile(&problem).unwrap();
        let first = achieve(&compiled.state, &compiled.goal, &PlannerConfig::default()).unwrap();
        let again = achieve(&first.final_state, &compiled.goal, &PlannerConfig::default()).unwrap();
        assert!(again.plan.is_empty(), "replan: {:?}", plan_strings(&again));
        assert_eq!(again.final_state_fingerprint, first.final_state_fingerprint);
    }
}

#[test]
fn already_held_images_are_never_retaken() {
    let report = run_problem(&fixtures::already_satisfied(), &PlannerConfig::default()).unwrap();
    assert!(report.plan.is_empty());
}

#[test]
fn last_chance_first_takes_the_single_taker_image_first() {
    let config = PlannerConfig {
        choice_policy: ChoicePolicy::LastChanceThenCheapest,
        ..PlannerConfig::default()
    };
    let report = run_problem(&fixtures::contested(), &config).unwrap();
    let first_take = report
        .plan
        .iter()
        .find(|a| matches!(a, Action::TakeImage { .. }))
        .unwrap();
    assert_eq!(first_take.to_string(), "take_image(s2, d2, i2, m1)");
}

#[test]
fn every_choice_policy_solves_contested_targets() {
    for policy in [
        ChoicePolicy::CheapestThenLastChance,
        ChoicePolicy::LastChanceThenCheapest,
        ChoicePolicy::CheapestOnly,
    ] {
        let config = PlannerConfig {
            choice_policy: policy,
            ..PlannerConfig::default()
        };
        let report = run_problem(&fixtures::contested(), &config).unwrap();
        assert_eq!(report.data_stored(), 2, "{policy:?}");
        replay(&fixtures::contested(), &report);
    }
}

#[test]
fn greedy_dead_end_is_recovered_by_backtracking() {
    let problem = fixtures::greedy_trap();
    let config = PlannerConfig {
        choice_policy: ChoicePolicy::CheapestThenLastChance,
        ..PlannerConfig::default()
    };
    let report = run_problem(&problem, &config).unwrap();
    assert_eq!(report.stats.backtracks, 1);
    assert_eq!(
        plan_strings(&report),
        [
            "switch_on(i1, s1)",
            "calibrate(s1, i1, d0)",
            "turn_to(s1, d2, d0)",
            "take_image(s1, d2, i1, m2)",
            "switch_on(i2, s2)",
            "calibrate(s2, i2, d0)",
            "turn_to(s2, d1, d0)",
            "take_image(s2, d1, i2, m1)",
        ]
    );
    replay(&problem, &report);

    let trace = report.trace.as_ref().unwrap();
    assert_eq!(trace.count("backtracked"), 1);
    assert!(trace.count("not_applicable") >= 1);

    // Last-chance first never enters the dead end.
    let direct = run_problem(&problem, &PlannerConfig::default()).unwrap();
    assert_eq!(direct.stats.backtracks, 0);
    assert_eq!(direct.plan, report.plan);
}

#[test]
fn greedy_only_policy_has_no_way_out_of_the_dead_end() {
    let config = PlannerConfig {
        choice_policy: ChoicePolicy::CheapestOnly,
        ..PlannerConfig::default()
    };
    let err = run_problem(&fixtures::greedy_trap(), &config).unwrap_err();
    assert!(matches!(err, RunError::PlanInfeasible { .. }));
}

// ---------------------------------------------------------------------------
// Unreachable goal pointings
// ---------------------------------------------------------------------------

#[test]
fn stranded_goal_pointing_fails_at_the_root_for_any_image_count() {
    for images in [1, 8, 24] {
        let err = run_problem(&fixtures::stranded_pointing(images), &PlannerConfig::default()).unwrap_err();
        let RunError::PlanInfeasible { stats } = err else {
            panic!("{images} images: expected PlanInfeasible, got {err}");
        };
        assert_eq!(stats.method_attempts, 1, "{images} images");
        assert_eq!(stats.backtracks, 0);
        assert_eq!(stats.actions_applied, 0);
    }
}

#[test]
fn stranded_goal_pointing_is_infeasible_under_a_tight_budget() {
    for policy in [
        ChoicePolicy::LastChanceThenCheapest,
        ChoicePolicy::CheapestThenLastChance,
        ChoicePolicy::CheapestOnly,
    ] {
        let config = PlannerConfig::from_json_str(&format!(
            r#"{{"choice_policy": "{}", "search": {{"max_method_attempts": 4}}}}"#,
            policy.as_str()
        ))
        .unwrap();
        let err = run_problem(&fixtures::stranded_pointing(16), &config).unwrap_err();
        assert!(matches!(err, RunError::PlanInfeasible { .. }), "{policy:?}: {err}");
    }
}

#[test]
fn fuel_for_the_final_move_makes_the_stranded_problem_solvable() {
    let mut problem = fixtures::stranded_pointing(8);
    problem.satellites[1].fuel = 5;
    let report = run_problem(&problem, &PlannerConfig::default()).unwrap();
    assert_eq!(report.data_stored(), 8);
    assert_eq!(
        report.plan.last().map(ToString::to_string).as_deref(),
        Some("turn_to(s2, far, d0)")
    );
    let final_state = replay(&problem, &report);
    assert_eq!(final_state.fuel(&"s2".into()), Some(0));
}

#[test]
fn unknown_identifiers_in_problems_fail_compilation() {
    let mut problem = fixtures::single_satellite();
    problem.goal.pointing.push(skyplan_kernel::carrier::compile::PointingGoalV1 {
        satellite: "s9".into(),
        direction: "d0".into(),
    });
    assert!(matches!(
        run_problem(&problem, &PlannerConfig::default()),
        Err(RunError::Problem(_))
    ));
}
