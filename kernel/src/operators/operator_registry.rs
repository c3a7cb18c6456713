//! `ActionRegistryV1`: the normative action catalog.
//!
//! Maps action names to their declared contracts (arity, category, parameter
//! names, precondition and effect). Content-addressed via canonical JSON so a
//! plan report can commit to the exact action set it was produced against.
//!
//! The registry is the **contract surface**; the dispatch in `apply.rs` is
//! the **implementation**. `apply()` refuses any action the registry does
//! not declare, so a reduced registry is a real restriction.

use std::collections::BTreeMap;

use crate::operators::action::{CALIBRATE, SWITCH_OFF, SWITCH_ON, TAKE_IMAGE, TURN_TO};
use crate::proof::canon::canonical_json_bytes;
use crate::proof::hash::{canonical_hash, ContentHash};
use crate::proof::hash_domain::HashDomain;

// ---------------------------------------------------------------------------
// ActionCategory
// ---------------------------------------------------------------------------

/// What part of the satellite an action touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionCategory {
    /// Changes pointing, spends fuel.
    Slew,
    /// Changes which instrument is powered.
    Power,
    /// Marks an instrument calibrated.
    Calibrate,
    /// Acquires an image, spends data capacity.
    Capture,
}

impl ActionCategory {
    /// Canonical string for JSON serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slew => "slew",
            Self::Power => "power",
            Self::Calibrate => "calibrate",
            Self::Capture => "capture",
        }
    }

    /// Parse from canonical string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "slew" => Some(Self::Slew),
            "power" => Some(Self::Power),
            "calibrate" => Some(Self::Calibrate),
            "capture" => Some(Self::Capture),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ActionEntry
// ---------------------------------------------------------------------------

/// A single entry in the action registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub name: String,
    /// Exact number of arguments in the wire form.
    pub arity: usize,
    pub category: ActionCategory,
    /// Parameter names in wire order (`parameters.len() == arity`).
    pub parameters: Vec<String>,
    /// Human-readable precondition.
    pub precondition: String,
    /// Human-readable effect.
    pub effect: String,
    /// Which resource the action consumes (`"fuel"`, `"data"`, `"none"`).
    pub cost_model: String,
}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Error type for action registry construction and serialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two entries share the same name.
    #[error("duplicate action in registry: {name}")]
    DuplicateAction { name: String },

    /// An entry's parameter list does not match its arity.
    #[error("action {name} declares arity {arity} but {parameters} parameters")]
    ArityMismatch {
        name: String,
        arity: usize,
        parameters: usize,
    },

    /// Canonical JSON serialization failed.
    #[error("action registry canonicalization failed: {detail}")]
    CanonicalizationError { detail: String },
}

// ---------------------------------------------------------------------------
// ActionRegistryV1
// ---------------------------------------------------------------------------

/// The action registry: maps action name → [`ActionEntry`].
///
/// `BTreeMap` for deterministic iteration order (by name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRegistryV1 {
    entries: BTreeMap<String, ActionEntry>,
    schema_version: String,
}

impl ActionRegistryV1 {
    /// Build a registry from a list of entries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAction`] if two entries share a name,
    /// or [`RegistryError::ArityMismatch`] if an entry's parameter list and
    /// arity disagree.
    pub fn new(schema_version: String, entries: Vec<ActionEntry>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            if entry.parameters.len() != entry.arity {
                return Err(RegistryError::ArityMismatch {
                    name: entry.name,
                    arity: entry.arity,
                    parameters: entry.parameters.len(),
                });
            }
            let name = entry.name.clone();
            if map.insert(name.clone(), entry).is_some() {
                return Err(RegistryError::DuplicateAction { name });
            }
        }
        Ok(Self {
            entries: map,
            schema_version,
        })
    }

    /// Look up an entry by action name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionEntry> {
        self.entries.get(name)
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &ActionEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Produce canonical JSON bytes for content-addressing.
    ///
    /// Format: sorted keys, entries array sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CanonicalizationError`] if canonical JSON
    /// serialization fails.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, RegistryError> {
        let entries_json: Vec<serde_json::Value> = self.entries.values().map(entry_to_json).collect();

        let value = serde_json::json!({
            "entries": entries_json,
            "schema_version": self.schema_version,
        });

        canonical_json_bytes(&value).map_err(|e| RegistryError::CanonicalizationError {
            detail: e.to_string(),
        })
    }

    /// Content hash of [`Self::canonical_bytes`] under
    /// [`HashDomain::ActionRegistry`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::canonical_bytes`].
    pub fn digest(&self) -> Result<ContentHash, RegistryError> {
        let bytes = self.canonical_bytes()?;
        Ok(canonical_hash(HashDomain::ActionRegistry, &bytes))
    }
}

fn entry_to_json(entry: &ActionEntry) -> serde_json::Value {
    serde_json::json!({
        "arity": entry.arity as u64,
        "category": entry.category.as_str(),
        "cost_model": entry.cost_model,
        "effect": entry.effect,
        "name": entry.name,
        "parameters": entry.parameters,
        "precondition": entry.precondition,
    })
}

// ---------------------------------------------------------------------------
// kernel_action_registry() — the canonical V1 action set
// ---------------------------------------------------------------------------

/// Schema version stamped into the kernel registry.
pub const KERNEL_REGISTRY_SCHEMA: &str = "skyplan.actions.v1";

fn entry(
    name: &str,
    category: ActionCategory,
    parameters: &[&str],
    precondition: &str,
    effect: &str,
    cost_model: &str,
) -> ActionEntry {
    ActionEntry {
        name: name.into(),
        arity: parameters.len(),
        category,
        parameters: parameters.iter().map(|p| (*p).to_string()).collect(),
        precondition: precondition.into(),
        effect: effect.into(),
        cost_model: cost_model.into(),
    }
}

/// Build the canonical action registry: `turn_to`, `switch_on`,
/// `switch_off`, `calibrate`, `take_image`.
#[must_use]
pub fn kernel_action_registry() -> ActionRegistryV1 {
    let entries = [
        entry(
            TURN_TO,
            ActionCategory::Slew,
            &["satellite", "new", "prev"],
            "pointing[satellite] == prev; new != prev; fuel[satellite] >= slew_time[(new, prev)]",
            "pointing[satellite] = new; fuel[satellite] -= cost; fuel_used += cost",
            "fuel",
        ),
        entry(
            SWITCH_ON,
            ActionCategory::Power,
            &["instrument", "satellite"],
            "on_board[instrument] == satellite; power_avail[satellite]",
            "powered[satellite] = instrument; calibrated[instrument] = false",
            "none",
        ),
        entry(
            SWITCH_OFF,
            ActionCategory::Power,
            &["instrument", "satellite"],
            "on_board[instrument] == satellite; power_on[instrument]",
            "powered[satellite] = none",
            "none",
        ),
        entry(
            CALIBRATE,
            ActionCategory::Calibrate,
            &["satellite", "instrument", "direction"],
            "on_board[instrument] == satellite; calibration_target[instrument] == direction; \
             pointing[satellite] == direction; power_on[instrument]",
            "calibrated[instrument] = true",
            "none",
        ),
        entry(
            TAKE_IMAGE,
            ActionCategory::Capture,
            &["satellite", "direction", "instrument", "mode"],
            "calibrated[instrument]; on_board[instrument] == satellite; mode in supports[instrument]; \
             power_on[instrument]; pointing[satellite] == direction; \
             data_capacity[satellite] >= data[(direction, mode)]",
            "data_capacity[satellite] -= size; have_image += (direction, mode); data_stored += size",
            "data",
        ),
    ];
    // Names are distinct and arities derived from the parameter lists, so
    // `new()` cannot fail here; build the map directly.
    ActionRegistryV1 {
        entries: entries.into_iter().map(|e| (e.name.clone(), e)).collect(),
        schema_version: KERNEL_REGISTRY_SCHEMA.into(),
    }
}
