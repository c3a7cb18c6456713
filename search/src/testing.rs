//! A counter domain for engine tests.
//!
//! `Reach(t)` refines into `[Bump, Reach(t)]` until the counter equals `t`.
//! `Bump` has two alternatives: `big` adds 5 (rejected past the limit) and
//! `small` adds 1 (guarded by `value < limit`).

use std::fmt;

use crate::contract::{ApplyOutcomeV1, PlanningDomainV1, TaskV1};
use crate::method::{MethodRegistryV1, Refinement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub value: i64,
    pub limit: i64,
}

impl Counter {
    pub fn new(limit: i64) -> Self {
        Self { value: 0, limit }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Add(i64),
    /// Always a fault.
    Corrupt,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(n) => write!(f, "add({n})"),
            Self::Corrupt => f.write_str("corrupt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Reach(i64),
    Bump,
    Forever,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reach(t) => write!(f, "reach({t})"),
            Self::Bump => f.write_str("bump"),
            Self::Forever => f.write_str("forever"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("counter corrupted")]
pub struct CounterFault;

pub struct CounterDomain;

impl PlanningDomainV1 for CounterDomain {
    type State = Counter;
    type Action = Op;
    type Task = Step;
    type Fault = CounterFault;

    fn domain_id(&self) -> &str {
        "counter"
    }

    fn task_name(&self, task: &Step) -> &'static str {
        match task {
            Step::Reach(_) => "reach",
            Step::Bump => "bump",
            Step::Forever => "forever",
        }
    }

    fn apply(&self, state: &mut Counter, action: &Op) -> Result<ApplyOutcomeV1, CounterFault> {
        match action {
            Op::Add(n) if state.value + n > state.limit => Ok(ApplyOutcomeV1::Rejected {
                detail: format!("{} + {n} exceeds {}", state.value, state.limit),
            }),
            Op::Add(n) => {
                state.value += n;
                Ok(ApplyOutcomeV1::Applied)
            }
            Op::Corrupt => Err(CounterFault),
        }
    }
}

fn reach(state: &Counter, task: &Step) -> Result<Refinement<CounterDomain>, CounterFault> {
    let Step::Reach(target) = task else {
        return Ok(Refinement::NotApplicable {
            reason: "not a reach task".into(),
        });
    };
    Ok(match state.value.cmp(target) {
        std::cmp::Ordering::Equal => Refinement::Subtasks(vec![]),
        std::cmp::Ordering::Greater => Refinement::NotApplicable {
            reason: format!("overshot {target}"),
        },
        std::cmp::Ordering::Less => Refinement::Subtasks(vec![
            TaskV1::Compound(Step::Bump),
            TaskV1::Compound(Step::Reach(*target)),
        ]),
    })
}

fn big(_: &Counter, _: &Step) -> Result<Refinement<CounterDomain>, CounterFault> {
    Ok(Refinement::Subtasks(vec![TaskV1::Primitive(Op::Add(5))]))
}

fn below_limit(state: &Counter, _: &Step) -> bool {
    state.value < state.limit
}

fn small(_: &Counter, _: &Step) -> Result<Refinement<CounterDomain>, CounterFault> {
    Ok(Refinement::Subtasks(vec![TaskV1::Primitive(Op::Add(1))]))
}

fn forever(_: &Counter, _: &Step) -> Result<Refinement<CounterDomain>, CounterFault> {
    Ok(Refinement::Subtasks(vec![TaskV1::Compound(Step::Forever)]))
}

pub fn counter_methods() -> MethodRegistryV1<CounterDomain> {
    let mut methods = MethodRegistryV1::new();
    methods.declare("reach", "reach", reach).unwrap();
    methods.declare("bump", "big", big).unwrap();
    methods.declare_guarded("bump", "small", below_limit, small).unwrap();
    methods.declare("forever", "forever", forever).unwrap();
    methods
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::MethodRegistryError;

    #[test]
    fn duplicate_method_rejected() {
        let mut methods = counter_methods();
        let err = methods.declare("bump", "big", big).unwrap_err();
        assert_eq!(
            err,
            MethodRegistryError::DuplicateMethod {
                task: "bump".into(),
                method: "big".into()
            }
        );
    }

    #[test]
    fn methods_keep_declaration_order() {
        let methods = counter_methods();
        let names: Vec<&str> = methods.methods_for("bump").iter().map(|m| m.name).collect();
        assert_eq!(names, ["big", "small"]);
        assert!(methods.methods_for("unknown").is_empty());
        assert_eq!(
            methods.to_json(),
            serde_json::json!({"bump": ["big", "small"], "forever": ["forever"], "reach": ["reach"]})
        );
    }
}
