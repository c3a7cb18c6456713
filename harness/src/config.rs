//! Planner configuration.
//!
//! A [`PlannerConfig`] selects the `choose_next_image` method order, may
//! override the engine budgets, and toggles post-search replay
//! verification. Every field has a default, so `{}` is a valid config.
//!
//! The effective config is digested into every [`crate::runner::PlanReportV1`],
//! committing the report to the conditions it was produced under.

use std::path::Path;

use serde::{Deserialize, Serialize};

use skyplan_kernel::proof::canon::{canonical_json_bytes, CanonError};
use skyplan_kernel::proof::hash::{canonical_hash, ContentHash};
use skyplan_kernel::proof::hash_domain::HashDomain;
use skyplan_search::policy::SearchPolicyV1;

/// Order in which the `choose_next_image` alternatives are tried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoicePolicy {
    /// Images only one satellite can still take go first (cheapest of them),
    /// with the greedy choice as the backtracking alternative.
    #[default]
    LastChanceThenCheapest,
    /// Greedy: the cheapest acquisition of the cheapest satellite, falling
    /// back to the last-chance image on backtrack.
    CheapestThenLastChance,
    /// Greedy with no alternative.
    CheapestOnly,
}

impl ChoicePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastChanceThenCheapest => "last_chance_then_cheapest",
            Self::CheapestThenLastChance => "cheapest_then_last_chance",
            Self::CheapestOnly => "cheapest_only",
        }
    }
}

/// Engine budget overrides. `None` keeps the [`SearchPolicyV1`] default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchOverrides {
    pub max_depth: Option<u32>,
    pub max_method_attempts: Option<u64>,
    pub record_trace: Option<bool>,
}

/// Effective planner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    pub choice_policy: ChoicePolicy,
    pub search: SearchOverrides,
    /// Replay the plan from the initial state before reporting it.
    pub verify_plan: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            choice_policy: ChoicePolicy::default(),
            search: SearchOverrides::default(),
            verify_plan: true,
        }
    }
}

/// Error loading a [`PlannerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON, an unknown field, or a value of the wrong type.
    #[error("invalid planner config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PlannerConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `json` is not a valid config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its content is not a valid config.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Engine policy with the overrides applied. Not validated here; the
    /// engine validates before searching.
    #[must_use]
    pub fn search_policy(&self) -> SearchPolicyV1 {
        let defaults = SearchPolicyV1::default();
        SearchPolicyV1 {
            max_depth: self.search.max_depth.unwrap_or(defaults.max_depth),
            max_method_attempts: self
                .search
                .max_method_attempts
                .unwrap_or(defaults.max_method_attempts),
            record_trace: self.search.record_trace.unwrap_or(defaults.record_trace),
        }
    }

    /// JSON of the effective configuration (overrides resolved).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "choice_policy": self.choice_policy.as_str(),
            "search": self.search_policy().to_json(),
            "verify_plan": self.verify_plan,
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json())?;
        Ok(canonical_hash(HashDomain::PlannerConfig, &bytes))
    }
}
