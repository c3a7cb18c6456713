//! Method registry: task name → ordered alternative methods.
//!
//! A method is a plain function of the current state and the task value. It
//! never mutates the state: it either refines the task into an ordered
//! subtask list or declares itself not applicable. Declaration order is the
//! order in which the engine tries the alternatives.

use std::collections::BTreeMap;
use std::fmt;

use crate::contract::{PlanningDomainV1, TaskV1};

/// Agenda entry type of domain `D`.
pub type AgendaTask<D> = TaskV1<<D as PlanningDomainV1>::Task, <D as PlanningDomainV1>::Action>;

/// Result of trying one method on one task.
pub enum Refinement<D: PlanningDomainV1> {
    /// Replace the task with these subtasks, executed left to right.
    Subtasks(Vec<AgendaTask<D>>),
    /// The method does not apply; try the next alternative.
    NotApplicable { reason: String },
}

impl<D: PlanningDomainV1> fmt::Debug for Refinement<D>
where
    D::Task: fmt::Debug,
    D::Action: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subtasks(subtasks) => f.debug_tuple("Subtasks").field(subtasks).finish(),
            Self::NotApplicable { reason } => f
                .debug_struct("NotApplicable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Cheap applicability check run before `refine`.
pub type GuardFn<D> = fn(&<D as PlanningDomainV1>::State, &<D as PlanningDomainV1>::Task) -> bool;

/// Refinement function of a method.
pub type RefineFn<D> = fn(
    &<D as PlanningDomainV1>::State,
    &<D as PlanningDomainV1>::Task,
) -> Result<Refinement<D>, <D as PlanningDomainV1>::Fault>;

/// A registered method.
pub struct MethodEntryV1<D: PlanningDomainV1> {
    pub name: &'static str,
    pub guard: Option<GuardFn<D>>,
    pub refine: RefineFn<D>,
}

impl<D: PlanningDomainV1> Clone for MethodEntryV1<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            guard: self.guard,
            refine: self.refine,
        }
    }
}

impl<D: PlanningDomainV1> fmt::Debug for MethodEntryV1<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntryV1")
            .field("name", &self.name)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// Error type for method registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MethodRegistryError {
    /// A task already has a method with this name.
    #[error("method {method} declared twice for task {task}")]
    DuplicateMethod { task: String, method: String },
}

/// Task name → ordered method alternatives.
pub struct MethodRegistryV1<D: PlanningDomainV1> {
    methods: BTreeMap<&'static str, Vec<MethodEntryV1<D>>>,
}

impl<D: PlanningDomainV1> Default for MethodRegistryV1<D> {
    fn default() -> Self {
        Self {
            methods: BTreeMap::new(),
        }
    }
}

impl<D: PlanningDomainV1> Clone for MethodRegistryV1<D> {
    fn clone(&self) -> Self {
        Self {
            methods: self.methods.clone(),
        }
    }
}

impl<D: PlanningDomainV1> fmt::Debug for MethodRegistryV1<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.methods.iter()).finish()
    }
}

impl<D: PlanningDomainV1> MethodRegistryV1<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an unguarded method to `task`'s alternatives.
    ///
    /// # Errors
    ///
    /// Returns [`MethodRegistryError::DuplicateMethod`] if `task` already has
    /// a method called `name`.
    pub fn declare(
        &mut self,
        task: &'static str,
        name: &'static str,
        refine: RefineFn<D>,
    ) -> Result<(), MethodRegistryError> {
        self.push(task, MethodEntryV1 {
            name,
            guard: None,
            refine,
        })
    }

    /// Append a guarded method to `task`'s alternatives.
    ///
    /// # Errors
    ///
    /// Same as [`Self::declare`].
    pub fn declare_guarded(
        &mut self,
        task: &'static str,
        name: &'static str,
        guard: GuardFn<D>,
        refine: RefineFn<D>,
    ) -> Result<(), MethodRegistryError> {
        self.push(task, MethodEntryV1 {
            name,
            guard: Some(guard),
            refine,
        })
    }

    fn push(&mut self, task: &'static str, entry: MethodEntryV1<D>) -> Result<(), MethodRegistryError> {
        let alternatives = self.methods.entry(task).or_default();
        if alternatives.iter().any(|m| m.name == entry.name) {
            return Err(MethodRegistryError::DuplicateMethod {
                task: task.to_string(),
                method: entry.name.to_string(),
            });
        }
        alternatives.push(entry);
        Ok(())
    }

    /// Methods of `task` in declaration order (empty if none).
    #[must_use]
    pub fn methods_for(&self, task: &str) -> &[MethodEntryV1<D>] {
        self.methods.get(task).map_or(&[], Vec::as_slice)
    }

    /// Registered task names, sorted.
    pub fn task_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.keys().copied()
    }

    /// `{task: [method, ...]}` with methods in declaration order.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .methods
            .iter()
            .map(|(task, methods)| {
                let names: Vec<serde_json::Value> =
                    methods.iter().map(|m| serde_json::Value::from(m.name)).collect();
                ((*task).to_string(), serde_json::Value::Array(names))
            })
            .collect();
        serde_json::Value::Object(map)
    }
}
