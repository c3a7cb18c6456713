//! Binary that plans a problem file and prints deterministic output lines
//! for cross-process verification.
//!
//! Usage: `plan_fixture <problem.json> [config.json]`
//!
//! Output: key=value lines on stdout. Logs go to stderr (`RUST_LOG`).

use std::path::Path;

use tracing_subscriber::EnvFilter;

use skyplan_harness::config::PlannerConfig;
use skyplan_harness::runner::run_problem;
use skyplan_kernel::carrier::compile::ProblemV1;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let problem_path = args
        .next()
        .expect("usage: plan_fixture <problem.json> [config.json]");
    let config = match args.next() {
        Some(path) => PlannerConfig::from_path(Path::new(&path)).expect("invalid config"),
        None => PlannerConfig::default(),
    };

    let bytes = std::fs::read(&problem_path).expect("cannot read problem file");
    let problem = ProblemV1::from_json_slice(&bytes).expect("invalid problem");
    let report = run_problem(&problem, &config).expect("planning failed");

    let trace_digest = report
        .trace
        .as_ref()
        .map(|trace| trace.digest().expect("trace digest").as_str().to_string())
        .unwrap_or_default();

    println!("plan_len={}", report.plan_len());
    for (index, action) in report.plan.iter().enumerate() {
        println!("step.{index}={action}");
    }
    println!("fuel_used={}", report.fuel_used());
    println!("data_stored={}", report.data_stored());
    println!("method_attempts={}", report.stats.method_attempts);
    println!("backtracks={}", report.stats.backtracks);
    println!("plan_digest={}", report.plan_digest);
    println!("final_state_fingerprint={}", report.final_state_fingerprint);
    println!("registry_digest={}", report.registry_digest);
    println!("policy_digest={}", report.policy_digest);
    println!("config_digest={}", report.config_digest);
    println!("trace_digest={trace_digest}");
    println!("verified={}", report.verified);
}
