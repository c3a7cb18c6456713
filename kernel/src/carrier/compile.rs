//! Compilation boundary: `compile(problem) -> (WorldState, Goal)`.
//!
//! A [`ProblemV1`] is the serde-facing description of a planning problem
//! (JSON on disk). `compile()` validates every cross-reference and produces
//! the typed state and goal the planner consumes. It is a pure function:
//! identical problems compile to identical states.
//!
//! Fail-closed: any dangling reference, duplicate name or conflicting slew
//! entry rejects the whole problem. Missing `slew_time`/`data` entries are
//! *not* rejected here; they surface as [`crate::error::StructuralError`]
//! the first time the planner needs them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::carrier::goal::Goal;
use crate::carrier::ids::{DirectionId, Image, InstrumentId, ModeId, SatelliteId};
use crate::carrier::world_state::{SatelliteInit, StaticTables, WorldState};

/// A planning problem as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemV1 {
    pub directions: Vec<String>,
    pub modes: Vec<String>,
    pub satellites: Vec<SatelliteSpecV1>,
    #[serde(default)]
    pub slew_time: Vec<SlewEntryV1>,
    #[serde(default)]
    pub data: Vec<DataEntryV1>,
    /// Images already acquired in the initial state.
    #[serde(default)]
    pub have_image: Vec<ImageSpecV1>,
    #[serde(default)]
    pub goal: GoalSpecV1,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SatelliteSpecV1 {
    pub name: String,
    pub pointing: String,
    pub fuel: u64,
    pub data_capacity: u64,
    #[serde(default)]
    pub instruments: Vec<InstrumentSpecV1>,
    /// Instrument powered in the initial state.
    #[serde(default)]
    pub powered: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentSpecV1 {
    pub name: String,
    pub supports: Vec<String>,
    pub calibration_target: String,
    #[serde(default)]
    pub calibrated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlewEntryV1 {
    pub from: String,
    pub to: String,
    pub cost: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataEntryV1 {
    pub direction: String,
    pub mode: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSpecV1 {
    pub direction: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoalSpecV1 {
    #[serde(default)]
    pub pointing: Vec<PointingGoalV1>,
    #[serde(default)]
    pub have_image: Vec<ImageSpecV1>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointingGoalV1 {
    pub satellite: String,
    pub direction: String,
}

impl ProblemV1 {
    /// Parse a problem from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::Parse`] for malformed JSON, unknown fields or
    /// non-integer quantities.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ProblemError> {
        serde_json::from_slice(bytes).map_err(|e| ProblemError::Parse {
            detail: e.to_string(),
        })
    }
}

/// A compiled, validated problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProblemV1 {
    pub state: WorldState,
    pub goal: Goal,
}

/// Typed compilation failure. No partial state is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProblemError {
    #[error("problem JSON rejected: {detail}")]
    Parse { detail: String },

    #[error("duplicate {kind} name {name:?}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{context} references unknown {kind} {name:?}")]
    UnknownReference {
        kind: &'static str,
        name: String,
        context: String,
    },

    #[error("slew_time ({from}, {to}) declared as {forward} and {backward}")]
    AsymmetricSlew {
        from: String,
        to: String,
        forward: u64,
        backward: u64,
    },

    #[error("data entry for ({direction}, {mode}) declared twice")]
    DuplicateData { direction: String, mode: String },

    #[error("goal points {satellite} at both {first} and {second}")]
    ConflictingPointing {
        satellite: String,
        first: String,
        second: String,
    },

    #[error("satellite {satellite} powers instrument {instrument} that is not on board")]
    PoweredNotOnBoard { satellite: String, instrument: String },
}

/// Compile a problem into its initial state and goal.
///
/// # Errors
///
/// Returns [`ProblemError`] on the first validation failure. Fail-closed.
pub fn compile(problem: &ProblemV1) -> Result<CompiledProblemV1, ProblemError> {
    let directions = declare_unique("direction", &problem.directions, DirectionId::new)?;
    let modes = declare_unique("mode", &problem.modes, ModeId::new)?;
    let satellite_names: Vec<String> = problem.satellites.iter().map(|s| s.name.clone()).collect();
    let satellites = declare_unique("satellite", &satellite_names, SatelliteId::new)?;
    let instrument_names: Vec<String> = problem
        .satellites
        .iter()
        .flat_map(|s| s.instruments.iter().map(|i| i.name.clone()))
        .collect();
    let instruments = declare_unique("instrument", &instrument_names, InstrumentId::new)?;

    let direction = |name: &str, context: &str| {
        lookup(&directions, name, "direction", context, DirectionId::as_str)
    };
    let mode = |name: &str, context: &str| lookup(&modes, name, "mode", context, ModeId::as_str);

    let mut tables = StaticTables {
        satellites: satellites.clone(),
        instruments: instruments.clone(),
        directions: directions.clone(),
        modes: modes.clone(),
        ..StaticTables::default()
    };
    let mut inits = BTreeMap::new();
    let mut calibrated = BTreeSet::new();

    for (spec, sat) in problem.satellites.iter().zip(&satellites) {
        let context = format!("satellite {}", spec.name);
        let mut mounted = Vec::with_capacity(spec.instruments.len());
        for instr_spec in &spec.instruments {
            let instr = InstrumentId::new(&instr_spec.name);
            let instr_context = format!("instrument {}", instr_spec.name);
            let supported = instr_spec
                .supports
                .iter()
                .map(|m| mode(m, &instr_context))
                .collect::<Result<BTreeSet<_>, _>>()?;
            let target = direction(&instr_spec.calibration_target, &instr_context)?;
            tables.on_board.insert(instr.clone(), sat.clone());
            tables.supports.insert(instr.clone(), supported);
            tables.calibration_target.insert(instr.clone(), target);
            if instr_spec.calibrated {
                calibrated.insert(instr.clone());
            }
            mounted.push(instr);
        }

        let powered = match &spec.powered {
            None => None,
            Some(name) => {
                let instr = InstrumentId::new(name);
                if !mounted.contains(&instr) {
                    return Err(ProblemError::PoweredNotOnBoard {
                        satellite: spec.name.clone(),
                        instrument: name.clone(),
                    });
                }
                Some(instr)
            }
        };

        tables.instruments_on.insert(sat.clone(), mounted);
        inits.insert(
            sat.clone(),
            SatelliteInit {
                pointing: direction(&spec.pointing, &context)?,
                powered,
                fuel: spec.fuel,
                data_capacity: spec.data_capacity,
            },
        );
    }

    for entry in &problem.slew_time {
        let context = format!("slew_time ({}, {})", entry.from, entry.to);
        let from = direction(&entry.from, &context)?;
        let to = direction(&entry.to, &context)?;
        insert_symmetric(&mut tables.slew_time, from, to, entry.cost)?;
    }

    for entry in &problem.data {
        let context = format!("data ({}, {})", entry.direction, entry.mode);
        let image = Image {
            direction: direction(&entry.direction, &context)?,
            mode: mode(&entry.mode, &context)?,
        };
        if tables.data.insert(image, entry.size).is_some() {
            return Err(ProblemError::DuplicateData {
                direction: entry.direction.clone(),
                mode: entry.mode.clone(),
            });
        }
    }

    let image = |spec: &ImageSpecV1, context: &str| -> Result<Image, ProblemError> {
        Ok(Image {
            direction: direction(&spec.direction, context)?,
            mode: mode(&spec.mode, context)?,
        })
    };

    let have_image = problem
        .have_image
        .iter()
        .map(|spec| image(spec, "initial have_image"))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let mut goal = Goal::new();
    for pointing in &problem.goal.pointing {
        let sat = lookup(
            &satellites,
            &pointing.satellite,
            "satellite",
            "goal pointing",
            SatelliteId::as_str,
        )?;
        let target = direction(&pointing.direction, "goal pointing")?;
        if let Some(first) = goal.pointing_for(&sat).filter(|first| **first != target) {
            return Err(ProblemError::ConflictingPointing {
                satellite: sat.to_string(),
                first: first.to_string(),
                second: target.to_string(),
            });
        }
        goal = goal.with_pointing(sat, target);
    }
    for spec in &problem.goal.have_image {
        goal = goal.with_image(image(spec, "goal have_image")?);
    }

    let state = WorldState::new(Arc::new(tables), inits, calibrated, have_image);
    Ok(CompiledProblemV1 { state, goal })
}

/// Check a goal built by hand against the problem tables.
///
/// # Errors
///
/// Returns [`ProblemError::UnknownReference`] for the first satellite,
/// direction or mode the tables do not declare.
pub fn validate_goal(tables: &StaticTables, goal: &Goal) -> Result<(), ProblemError> {
    let unknown = |kind: &'static str, name: &str, context: &str| ProblemError::UnknownReference {
        kind,
        name: name.to_string(),
        context: context.to_string(),
    };
    for (sat, dir) in goal.pointing() {
        if !tables.has_satellite(sat) {
            return Err(unknown("satellite", sat.as_str(), "goal pointing"));
        }
        if !tables.has_direction(dir) {
            return Err(unknown("direction", dir.as_str(), "goal pointing"));
        }
    }
    for img in goal.images() {
        if !tables.has_direction(&img.direction) {
            return Err(unknown("direction", img.direction.as_str(), "goal have_image"));
        }
        if !tables.has_mode(&img.mode) {
            return Err(unknown("mode", img.mode.as_str(), "goal have_image"));
        }
    }
    Ok(())
}

fn declare_unique<T>(
    kind: &'static str,
    names: &[String],
    make: impl Fn(&str) -> T,
) -> Result<Vec<T>, ProblemError> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ProblemError::DuplicateName {
                kind,
                name: name.clone(),
            });
        }
        out.push(make(name));
    }
    Ok(out)
}

fn lookup<T: Clone>(
    declared: &[T],
    name: &str,
    kind: &'static str,
    context: &str,
    as_str: impl Fn(&T) -> &str,
) -> Result<T, ProblemError> {
    declared
        .iter()
        .find(|id| as_str(id) == name)
        .cloned()
        .ok_or_else(|| ProblemError::UnknownReference {
            kind,
            name: name.to_string(),
            context: context.to_string(),
        })
}

/// Insert `(from, to)` and its mirror. A pair may be declared in one or both
/// orientations, but both declarations must agree.
fn insert_symmetric(
    table: &mut BTreeMap<(DirectionId, DirectionId), u64>,
    from: DirectionId,
    to: DirectionId,
    cost: u64,
) -> Result<(), ProblemError> {
    if let Some(&existing) = table.get(&(from.clone(), to.clone())) {
        if existing != cost {
            return Err(ProblemError::AsymmetricSlew {
                from: from.to_string(),
                to: to.to_string(),
                forward: existing,
                backward: cost,
            });
        }
    }
    table.insert((to.clone(), from.clone()), cost);
    table.insert((from, to), cost);
    Ok(())
}
