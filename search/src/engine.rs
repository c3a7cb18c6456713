//! Task-network refinement engine.
//!
//! Depth-first, left-to-right refinement with chronological backtracking,
//! driven by an explicit stack of choice points (no native recursion).
//!
//! Every compound task popped from the agenda opens a choice point holding
//! a snapshot of the state, the rest of the agenda, the plan length, and the
//! index of the next untried method. A failure anywhere (a method that does
//! not apply, a rejected primitive) resumes the most recent choice point
//! with an untried method: the snapshot is restored, the plan truncated, and
//! the next alternative tried. A choice point whose last alternative has
//! refined is dropped immediately, since resuming it could only exhaust it.
//!
//! Search ends when the agenda is empty (plan found) or the choice stack is
//! empty after a failure (no plan).

use tracing::{debug, info, info_span};

use crate::contract::{ApplyOutcomeV1, PlanningDomainV1, TaskV1};
use crate::error::SearchError;
use crate::method::{AgendaTask, MethodRegistryV1, Refinement};
use crate::policy::SearchPolicyV1;
use crate::trace::{RefinementTraceV1, TraceEventV1};

/// How a search ended (fatal errors are [`SearchError`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcomeV1<S, A> {
    Found { plan: Vec<A>, final_state: S },
    /// Every alternative at the root was exhausted.
    NoPlan,
}

/// Counters of one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatsV1 {
    pub method_attempts: u64,
    pub refinements: u64,
    pub not_applicable: u64,
    pub guard_rejections: u64,
    pub actions_applied: u64,
    pub actions_rejected: u64,
    /// Snapshot restorations to try a later alternative.
    pub backtracks: u64,
    pub max_depth_reached: u32,
    pub peak_choice_points: u64,
}

impl SearchStatsV1 {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "actions_applied": self.actions_applied,
            "actions_rejected": self.actions_rejected,
            "backtracks": self.backtracks,
            "guard_rejections": self.guard_rejections,
            "max_depth_reached": self.max_depth_reached,
            "method_attempts": self.method_attempts,
            "not_applicable": self.not_applicable,
            "peak_choice_points": self.peak_choice_points,
            "refinements": self.refinements,
        })
    }
}

/// Result of [`plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultV1<S, A> {
    pub outcome: SearchOutcomeV1<S, A>,
    pub stats: SearchStatsV1,
    /// Present iff the policy records traces.
    pub trace: Option<RefinementTraceV1>,
}

impl<S, A> SearchResultV1<S, A> {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcomeV1::Found { .. })
    }

    /// The plan, if one was found.
    #[must_use]
    pub fn plan(&self) -> Option<&[A]> {
        match &self.outcome {
            SearchOutcomeV1::Found { plan, .. } => Some(plan),
            SearchOutcomeV1::NoPlan => None,
        }
    }
}

/// Agenda stored reversed: the next task is at the end.
type Agenda<D> = Vec<(AgendaTask<D>, u32)>;

struct ChoicePoint<D: PlanningDomainV1> {
    state: D::State,
    agenda: Agenda<D>,
    plan_len: usize,
    task: D::Task,
    depth: u32,
    next_method: usize,
}

struct Run<'a, D: PlanningDomainV1> {
    domain: &'a D,
    methods: &'a MethodRegistryV1<D>,
    policy: &'a SearchPolicyV1,
    state: D::State,
    agenda: Agenda<D>,
    plan: Vec<D::Action>,
    stack: Vec<ChoicePoint<D>>,
    stats: SearchStatsV1,
    trace: Option<RefinementTraceV1>,
}

fn record(trace: &mut Option<RefinementTraceV1>, event: impl FnOnce() -> TraceEventV1) {
    if let Some(trace) = trace {
        trace.push(event());
    }
}

/// Refine `tasks` (left to right) from `initial`.
///
/// # Errors
///
/// Returns [`SearchError`] on an invalid policy, a task without methods, a
/// budget overrun, or a fatal domain fault. Exhausting every alternative is
/// not an error: it yields [`SearchOutcomeV1::NoPlan`].
pub fn plan<D: PlanningDomainV1>(
    domain: &D,
    methods: &MethodRegistryV1<D>,
    initial: &D::State,
    tasks: Vec<AgendaTask<D>>,
    policy: &SearchPolicyV1,
) -> Result<SearchResultV1<D::State, D::Action>, SearchError> {
    policy.validate()?;
    let span = info_span!("plan", domain = domain.domain_id());
    let _entered = span.enter();

    let mut run = Run {
        domain,
        methods,
        policy,
        state: initial.clone(),
        agenda: tasks.into_iter().rev().map(|t| (t, 0)).collect(),
        plan: Vec::new(),
        stack: Vec::new(),
        stats: SearchStatsV1::default(),
        trace: policy.record_trace.then(RefinementTraceV1::default),
    };

    let found = run.execute()?;
    let stats = run.stats;
    let outcome = if found {
        info!(
            plan_len = run.plan.len(),
            method_attempts = stats.method_attempts,
            backtracks = stats.backtracks,
            "plan found"
        );
        SearchOutcomeV1::Found {
            plan: run.plan,
            final_state: run.state,
        }
    } else {
        info!(
            method_attempts = stats.method_attempts,
            backtracks = stats.backtracks,
            "no plan: root alternatives exhausted"
        );
        SearchOutcomeV1::NoPlan
    };
    Ok(SearchResultV1 {
        outcome,
        stats,
        trace: run.trace,
    })
}

impl<D: PlanningDomainV1> Run<'_, D> {
    /// Returns `true` on an empty agenda, `false` when no choice point is
    /// left to resume.
    fn execute(&mut self) -> Result<bool, SearchError> {
        while let Some((task, depth)) = self.agenda.pop() {
            let progressed = match task {
                TaskV1::Primitive(action) => self.apply_primitive(action)?,
                TaskV1::Compound(task) => self.open_choice_point(task, depth)?,
            };
            if !progressed && !self.resume()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Apply a primitive. `Ok(false)` if it was rejected.
    fn apply_primitive(&mut self, action: D::Action) -> Result<bool, SearchError> {
        let outcome = self
            .domain
            .apply(&mut self.state, &action)
            .map_err(|fault| SearchError::Structural {
                task: action.to_string(),
                source: Box::new(fault),
            })?;
        match outcome {
            ApplyOutcomeV1::Applied => {
                self.stats.actions_applied += 1;
                record(&mut self.trace, || TraceEventV1::ActionApplied {
                    action: action.to_string(),
                });
                self.plan.push(action);
                Ok(true)
            }
            ApplyOutcomeV1::Rejected { detail } => {
                self.stats.actions_rejected += 1;
                debug!(action = %action, %detail, "action rejected");
                record(&mut self.trace, || TraceEventV1::ActionRejected {
                    action: action.to_string(),
                    detail,
                });
                Ok(false)
            }
        }
    }

    /// Push a choice point for `task` and try its first applicable method.
    fn open_choice_point(&mut self, task: D::Task, depth: u32) -> Result<bool, SearchError> {
        if depth >= self.policy.max_depth {
            return Err(SearchError::DepthLimitExceeded {
                depth,
                limit: self.policy.max_depth,
            });
        }
        let name = self.domain.task_name(&task);
        if self.methods.methods_for(name).is_empty() {
            return Err(SearchError::UnknownTask {
                task: name.to_string(),
            });
        }
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(depth);
        self.stack.push(ChoicePoint {
            state: self.state.clone(),
            agenda: self.agenda.clone(),
            plan_len: self.plan.len(),
            task,
            depth,
            next_method: 0,
        });
        self.stats.peak_choice_points = self.stats.peak_choice_points.max(self.stack.len() as u64);
        self.resume()
    }

    /// Try the next alternative of the most recent choice point, popping
    /// exhausted ones. `Ok(false)` when the stack runs empty.
    fn resume(&mut self) -> Result<bool, SearchError> {
        let domain = self.domain;
        let methods = self.methods;
        loop {
            let Some(cp) = self.stack.last_mut() else {
                return Ok(false);
            };
            let alternatives = methods.methods_for(domain.task_name(&cp.task));
            let Some(method) = alternatives.get(cp.next_method) else {
                debug!(task = %cp.task, "alternatives exhausted");
                record(&mut self.trace, || TraceEventV1::Exhausted {
                    task: cp.task.to_string(),
                });
                self.stack.pop();
                continue;
            };

            if self.stats.method_attempts >= self.policy.max_method_attempts {
                return Err(SearchError::MethodBudgetExhausted {
                    limit: self.policy.max_method_attempts,
                });
            }
            self.stats.method_attempts += 1;

            if cp.next_method > 0 {
                self.stats.backtracks += 1;
                self.state.clone_from(&cp.state);
                self.agenda.clone_from(&cp.agenda);
                self.plan.truncate(cp.plan_len);
                record(&mut self.trace, || TraceEventV1::Backtracked {
                    task: cp.task.to_string(),
                    plan_len: cp.plan_len,
                });
            }
            cp.next_method += 1;
            let last_alternative = cp.next_method == alternatives.len();

            debug!(task = %cp.task, method = method.name, depth = cp.depth, "trying method");
            record(&mut self.trace, || TraceEventV1::MethodTried {
                depth: cp.depth,
                task: cp.task.to_string(),
                method: method.name,
            });

            if let Some(guard) = method.guard {
                if !guard(&self.state, &cp.task) {
                    self.stats.guard_rejections += 1;
                    record(&mut self.trace, || TraceEventV1::GuardRejected {
                        task: cp.task.to_string(),
                        method: method.name,
                    });
                    continue;
                }
            }

            let refinement =
                (method.refine)(&self.state, &cp.task).map_err(|fault| SearchError::Structural {
                    task: cp.task.to_string(),
                    source: Box::new(fault),
                })?;

            match refinement {
                Refinement::NotApplicable { reason } => {
                    self.stats.not_applicable += 1;
                    debug!(task = %cp.task, method = method.name, %reason, "method not applicable");
                    record(&mut self.trace, || TraceEventV1::NotApplicable {
                        task: cp.task.to_string(),
                        method: method.name,
                        reason,
                    });
                }
                Refinement::Subtasks(subtasks) => {
                    self.stats.refinements += 1;
                    record(&mut self.trace, || TraceEventV1::Refined {
                        task: cp.task.to_string(),
                        method: method.name,
                        subtasks: subtasks.len(),
                    });
                    let child_depth = cp.depth + 1;
                    if last_alternative {
                        self.stack.pop();
                    }
                    self.agenda
                        .extend(subtasks.into_iter().rev().map(|t| (t, child_depth)));
                    return Ok(true);
                }
            }
        }
    }
}
