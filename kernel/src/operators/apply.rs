//! `apply()`: apply a primitive action to a `WorldState`, producing a step record.
//!
//! The single exported entry point for action application. Requires an
//! `ActionRegistryV1`; there is no bypass path.
//!
//! Two-phase check:
//! 1. Registry lookup (contract): is the action declared?
//! 2. Precondition check (implementation): every precondition is evaluated
//!    against the unmodified state. Only when all of them hold is the state
//!    mutated, so a rejected action leaves the state untouched.
//!
//! Preconditions are evaluated in a fixed order. Table lookups (`slew_time`,
//! `data`) happen after the fact checks that precede them, so a missing
//! entry is only reported for an action that would otherwise be applicable.

use tracing::trace;

use crate::carrier::ids::{DirectionId, Image, InstrumentId, ModeId, SatelliteId};
use crate::carrier::world_state::WorldState;
use crate::error::StructuralError;
use crate::operators::action::Action;
use crate::operators::operator_registry::ActionRegistryV1;

/// A step record produced by applying an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub action: Action,
    /// Fuel consumed by this step (`turn_to` only).
    pub fuel_spent: u64,
    /// Data capacity consumed by this step (`take_image` only).
    pub data_spent: u64,
}

/// Typed failure for action application. Fail-closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyFailure {
    /// The action is not declared in the registry.
    #[error("action {name} is not declared in the registry")]
    UnknownAction { name: String },

    /// A precondition does not hold. Recoverable: the search backtracks.
    #[error("{action}: precondition not met: {detail}")]
    PreconditionNotMet { action: String, detail: String },

    /// Static data needed to evaluate the action is missing. Fatal.
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl ApplyFailure {
    /// Whether the failure only rules out this branch.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PreconditionNotMet { .. })
    }
}

/// Apply `action` to `state`.
///
/// # Errors
///
/// Returns [`ApplyFailure`] on:
/// - `UnknownAction`: the action's name is not in `registry`
/// - `PreconditionNotMet`: some precondition is false (state unchanged)
/// - `Structural`: a required `slew_time` or `data` entry is missing
///   (state unchanged)
pub fn apply(
    state: &mut WorldState,
    action: &Action,
    registry: &ActionRegistryV1,
) -> Result<StepRecord, ApplyFailure> {
    // Phase 1: Registry lookup (contract check).
    if !registry.contains(action.name()) {
        return Err(ApplyFailure::UnknownAction {
            name: action.name().to_string(),
        });
    }

    // Phase 2: Preconditions, then effects.
    match action {
        Action::TurnTo {
            satellite,
            new,
            prev,
        } => apply_turn_to(state, action, satellite, new, prev),
        Action::SwitchOn {
            instrument,
            satellite,
        } => apply_switch_on(state, action, instrument, satellite),
        Action::SwitchOff {
            instrument,
            satellite,
        } => apply_switch_off(state, action, instrument, satellite),
        Action::Calibrate {
            satellite,
            instrument,
            direction,
        } => apply_calibrate(state, action, satellite, instrument, direction),
        Action::TakeImage {
            satellite,
            direction,
            instrument,
            mode,
        } => apply_take_image(state, action, satellite, direction, instrument, mode),
    }
}

/// Fail with `PreconditionNotMet` unless `holds`.
fn require(holds: bool, action: &Action, detail: impl FnOnce() -> String) -> Result<(), ApplyFailure> {
    if holds {
        return Ok(());
    }
    let detail = detail();
    trace!(action = %action, %detail, "precondition rejected");
    Err(ApplyFailure::PreconditionNotMet {
        action: action.to_string(),
        detail,
    })
}

fn record(action: &Action, fuel_spent: u64, data_spent: u64) -> StepRecord {
    StepRecord {
        action: action.clone(),
        fuel_spent,
        data_spent,
    }
}

fn apply_turn_to(
    state: &mut WorldState,
    action: &Action,
    satellite: &SatelliteId,
    new: &DirectionId,
    prev: &DirectionId,
) -> Result<StepRecord, ApplyFailure> {
    require(state.pointing(satellite) == Some(prev), action, || {
        format!("{satellite} is not pointing at {prev}")
    })?;
    require(new != prev, action, || format!("{satellite} already points at {new}"))?;
    let cost = state
        .tables()
        .slew_time(new, prev)
        .ok_or_else(|| StructuralError::MissingCostEntry {
            from: new.clone(),
            to: prev.clone(),
        })?;
    let fuel = state.fuel(satellite).unwrap_or(0);
    require(fuel >= cost, action, || {
        format!("{satellite} has fuel {fuel}, slew costs {cost}")
    })?;

    state.set_pointing(satellite, new.clone());
    state.spend_fuel(satellite, cost);
    Ok(record(action, cost, 0))
}

fn apply_switch_on(
    state: &mut WorldState,
    action: &Action,
    instrument: &InstrumentId,
    satellite: &SatelliteId,
) -> Result<StepRecord, ApplyFailure> {
    require(state.tables().on_board(instrument) == Some(satellite), action, || {
        format!("{instrument} is not on board {satellite}")
    })?;
    require(state.power_avail(satellite), action, || {
        format!("{satellite} has no power available")
    })?;

    state.set_powered(satellite, Some(instrument.clone()));
    state.set_calibrated(instrument, false);
    Ok(record(action, 0, 0))
}

fn apply_switch_off(
    state: &mut WorldState,
    action: &Action,
    instrument: &InstrumentId,
    satellite: &SatelliteId,
) -> Result<StepRecord, ApplyFailure> {
    require(state.tables().on_board(instrument) == Some(satellite), action, || {
        format!("{instrument} is not on board {satellite}")
    })?;
    require(state.power_on(instrument), action, || format!("{instrument} is not powered"))?;

    state.set_powered(satellite, None);
    Ok(record(action, 0, 0))
}

fn apply_calibrate(
    state: &mut WorldState,
    action: &Action,
    satellite: &SatelliteId,
    instrument: &InstrumentId,
    direction: &DirectionId,
) -> Result<StepRecord, ApplyFailure> {
    require(state.tables().on_board(instrument) == Some(satellite), action, || {
        format!("{instrument} is not on board {satellite}")
    })?;
    require(
        state.tables().calibration_target(instrument) == Some(direction),
        action,
        || format!("{direction} is not the calibration target of {instrument}"),
    )?;
    require(state.pointing(satellite) == Some(direction), action, || {
        format!("{satellite} is not pointing at {direction}")
    })?;
    require(state.power_on(instrument), action, || format!("{instrument} is not powered"))?;

    state.set_calibrated(instrument, true);
    Ok(record(action, 0, 0))
}

fn apply_take_image(
    state: &mut WorldState,
    action: &Action,
    satellite: &SatelliteId,
    direction: &DirectionId,
    instrument: &InstrumentId,
    mode: &ModeId,
) -> Result<StepRecord, ApplyFailure> {
    require(state.is_calibrated(instrument), action, || {
        format!("{instrument} is not calibrated")
    })?;
    require(state.tables().on_board(instrument) == Some(satellite), action, || {
        format!("{instrument} is not on board {satellite}")
    })?;
    require(state.tables().supports(instrument, mode), action, || {
        format!("{instrument} does not support {mode}")
    })?;
    require(state.power_on(instrument), action, || format!("{instrument} is not powered"))?;
    require(state.pointing(satellite) == Some(direction), action, || {
        format!("{satellite} is not pointing at {direction}")
    })?;
    let image = Image {
        direction: direction.clone(),
        mode: mode.clone(),
    };
    let size = state
        .tables()
        .data(&image)
        .ok_or_else(|| StructuralError::MissingDataEntry {
            image: image.clone(),
        })?;
    let capacity = state.data_capacity(satellite).unwrap_or(0);
    require(capacity >= size, action, || {
        format!("{satellite} has capacity {capacity}, image needs {size}")
    })?;

    state.store_image(satellite, image, size);
    Ok(record(action, 0, size))
}
