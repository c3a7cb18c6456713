//! Fuel cost estimates over the current `WorldState`.
//!
//! Pure functions: no state is mutated. A missing `slew_time` entry for an
//! unequal direction pair is a [`StructuralError`], never a silent zero.

use crate::carrier::goal::Goal;
use crate::carrier::ids::{DirectionId, Image, InstrumentId, SatelliteId};
use crate::carrier::world_state::{StaticTables, WorldState};
use crate::error::StructuralError;

/// The cheapest way for one satellite to be ready to image a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    /// Fuel spent slewing (via the calibration target when needed).
    pub cost: u64,
    pub instrument: InstrumentId,
}

/// Fuel to slew from `from` to `to`: 0 when equal, else the table entry.
///
/// # Errors
///
/// Returns [`StructuralError::MissingCostEntry`] if the directions differ
/// and the table has no entry for the pair.
pub fn reposition_cost(
    tables: &StaticTables,
    from: &DirectionId,
    to: &DirectionId,
) -> Result<u64, StructuralError> {
    if from == to {
        return Ok(0);
    }
    tables
        .slew_time(from, to)
        .ok_or_else(|| StructuralError::MissingCostEntry {
            from: from.clone(),
            to: to.clone(),
        })
}

/// Cheapest instrument on `satellite` for acquiring `image`.
///
/// An instrument that is powered and calibrated slews straight to the
/// target; any other instrument must first visit its calibration target.
/// Instruments are tried in declaration order and a later instrument only
/// wins with a strictly lower cost.
///
/// Returns `Ok(None)` if no instrument on board supports the image's mode.
///
/// # Errors
///
/// Returns [`StructuralError::UnknownSatellite`] if `satellite` has no
/// pointing, or [`StructuralError::MissingCostEntry`] for a missing slew entry.
pub fn acquisition_cost(
    state: &WorldState,
    satellite: &SatelliteId,
    image: &Image,
) -> Result<Option<Acquisition>, StructuralError> {
    let tables = state.tables();
    let current = state
        .pointing(satellite)
        .ok_or_else(|| StructuralError::UnknownSatellite {
            satellite: satellite.clone(),
        })?;

    let mut best: Option<Acquisition> = None;
    for instrument in tables.instruments_on(satellite) {
        if !tables.supports(instrument, &image.mode) {
            continue;
        }
        let cost = if state.power_on(instrument) && state.is_calibrated(instrument) {
            reposition_cost(tables, current, &image.direction)?
        } else {
            let target = tables.calibration_target(instrument).ok_or_else(|| {
                StructuralError::UnknownInstrument {
                    instrument: instrument.clone(),
                }
            })?;
            reposition_cost(tables, current, target)?
                .saturating_add(reposition_cost(tables, target, &image.direction)?)
        };
        if best.as_ref().map_or(true, |b| cost < b.cost) {
            best = Some(Acquisition {
                cost,
                instrument: instrument.clone(),
            });
        }
    }
    Ok(best)
}

/// Fuel `satellite` must keep in reserve to reach its required final
/// direction from `provisional`. 0 when the goal does not constrain it.
///
/// # Errors
///
/// Returns [`StructuralError::MissingCostEntry`] for a missing slew entry.
pub fn end_position_cost(
    state: &WorldState,
    goal: &Goal,
    satellite: &SatelliteId,
    provisional: &DirectionId,
) -> Result<u64, StructuralError> {
    match goal.pointing_for(satellite) {
        None => Ok(0),
        Some(target) => reposition_cost(state.tables(), provisional, target),
    }
}
