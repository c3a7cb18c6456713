//! Problem and config files on disk.

use skyplan_harness::config::{ChoicePolicy, PlannerConfig};
use skyplan_harness::runner::run_problem;
use skyplan_harness::worlds::satellite::fixtures;
use skyplan_kernel::carrier::compile::{compile, ProblemError, ProblemV1};

#[test]
fn problem_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.json");
    let problem = fixtures::fleet(3, 4);
    std::fs::write(&path, serde_json::to_vec_pretty(&problem).unwrap()).unwrap();

    let loaded = ProblemV1::from_json_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(loaded, problem);
    assert_eq!(
        compile(&loaded).unwrap().state,
        compile(&problem).unwrap().state
    );
}

#[test]
fn fractional_quantities_are_rejected() {
    let json = br#"{
        "directions": ["d0"], "modes": ["m1"],
        "satellites": [{"name": "s1", "pointing": "d0", "fuel": 2.5, "data_capacity": 1}]
    }"#;
    assert!(matches!(ProblemV1::from_json_slice(json), Err(ProblemError::Parse { .. })));
}

#[test]
fn unknown_problem_fields_are_rejected() {
    let json = br#"{"directions": [], "modes": [], "satellites": [], "weather": "cloudy"}"#;
    assert!(ProblemV1::from_json_slice(json).is_err());
}

#[test]
fn config_file_drives_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.json");
    std::fs::write(
        &path,
        r#"{"choice_policy": "cheapest_only", "search": {"record_trace": false}, "verify_plan": false}"#,
    )
    .unwrap();
    let config = PlannerConfig::from_path(&path).unwrap();
    assert_eq!(config.choice_policy, ChoicePolicy::CheapestOnly);

    let report = run_problem(&fixtures::two_satellites(), &config).unwrap();
    assert!(report.trace.is_none());
    assert!(!report.verified);
    assert_eq!(report.plan_len(), 10);
}

#[test]
fn fleet_fixture_is_planned_end_to_end() {
    let report = run_problem(&fixtures::fleet(4, 8), &PlannerConfig::default()).unwrap();
    assert_eq!(report.data_stored(), 8);
    assert!(report.verified);
}
