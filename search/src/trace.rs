//! `RefinementTraceV1`: ordered audit log of one search.
//!
//! Events are appended in execution order. The trace is deterministic: the
//! same domain, registry, initial state and policy produce byte-identical
//! canonical JSON.

use skyplan_kernel::proof::canon::{canonical_json_bytes, CanonError};
use skyplan_kernel::proof::hash::{canonical_hash, ContentHash};
use skyplan_kernel::proof::hash_domain::HashDomain;

/// One engine event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEventV1 {
    MethodTried {
        depth: u32,
        task: String,
        method: &'static str,
    },
    GuardRejected {
        task: String,
        method: &'static str,
    },
    NotApplicable {
        task: String,
        method: &'static str,
        reason: String,
    },
    Refined {
        task: String,
        method: &'static str,
        subtasks: usize,
    },
    ActionApplied {
        action: String,
    },
    ActionRejected {
        action: String,
        detail: String,
    },
    /// A snapshot was restored to try the next alternative of `task`.
    Backtracked {
        task: String,
        plan_len: usize,
    },
    /// Every alternative of `task` failed.
    Exhausted {
        task: String,
    },
}

impl TraceEventV1 {
    /// Canonical kind tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MethodTried { .. } => "method_tried",
            Self::GuardRejected { .. } => "guard_rejected",
            Self::NotApplicable { .. } => "not_applicable",
            Self::Refined { .. } => "refined",
            Self::ActionApplied { .. } => "action_applied",
            Self::ActionRejected { .. } => "action_rejected",
            Self::Backtracked { .. } => "backtracked",
            Self::Exhausted { .. } => "exhausted",
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = match self {
            Self::MethodTried {
                depth,
                task,
                method,
            } => serde_json::json!({"depth": depth, "method": method, "task": task}),
            Self::GuardRejected { task, method } => {
                serde_json::json!({"method": method, "task": task})
            }
            Self::NotApplicable {
                task,
                method,
                reason,
            } => serde_json::json!({"method": method, "reason": reason, "task": task}),
            Self::Refined {
                task,
                method,
                subtasks,
            } => serde_json::json!({"method": method, "subtasks": *subtasks as u64, "task": task}),
            Self::ActionApplied { action } => serde_json::json!({"action": action}),
            Self::ActionRejected { action, detail } => {
                serde_json::json!({"action": action, "detail": detail})
            }
            Self::Backtracked { task, plan_len } => {
                serde_json::json!({"plan_len": *plan_len as u64, "task": task})
            }
            Self::Exhausted { task } => serde_json::json!({"task": task}),
        };
        if let Some(map) = value.as_object_mut() {
            map.insert("kind".into(), self.kind().into());
        }
        value
    }
}

/// Ordered event log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefinementTraceV1 {
    events: Vec<TraceEventV1>,
}

impl RefinementTraceV1 {
    pub fn push(&mut self, event: TraceEventV1) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEventV1] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events of the given kind.
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        let events: Vec<serde_json::Value> = self.events.iter().map(TraceEventV1::to_json).collect();
        canonical_json_bytes(&serde_json::json!({
            "event_count": self.events.len() as u64,
            "events": events,
            "schema_version": "refinement_trace.v1",
        }))
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(HashDomain::RefinementTrace, &bytes))
    }
}
