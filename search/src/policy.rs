//! Search policy: hard budgets for the refinement engine.

use skyplan_kernel::proof::canon::{canonical_json_bytes, CanonError};
use skyplan_kernel::proof::hash::{canonical_hash, ContentHash};
use skyplan_kernel::proof::hash_domain::HashDomain;

use crate::error::SearchError;

/// Engine budgets. Exceeding either budget aborts the search with a typed
/// error; neither is a reason to backtrack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPolicyV1 {
    /// Maximum refinement nesting depth. Root tasks are at depth 0; the
    /// subtasks of a task at depth `d` are at depth `d + 1`.
    pub max_depth: u32,
    /// Maximum number of method attempts over the whole search.
    pub max_method_attempts: u64,
    /// Whether to record a [`crate::trace::RefinementTraceV1`].
    pub record_trace: bool,
}

impl SearchPolicyV1 {
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] if a budget is zero.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_depth == 0 {
            return Err(SearchError::InvalidPolicy {
                detail: "max_depth must be at least 1".into(),
            });
        }
        if self.max_method_attempts == 0 {
            return Err(SearchError::InvalidPolicy {
                detail: "max_method_attempts must be at least 1".into(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "max_depth": self.max_depth,
            "max_method_attempts": self.max_method_attempts,
            "record_trace": self.record_trace,
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json())?;
        Ok(canonical_hash(HashDomain::SearchPolicy, &bytes))
    }
}

impl Default for SearchPolicyV1 {
    fn default() -> Self {
        Self {
            max_depth: 4096,
            max_method_attempts: 1_000_000,
            record_trace: true,
        }
    }
}
