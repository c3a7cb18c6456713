//! Decomposition methods of the satellite domain.
//!
//! ```text
//! achieve(goal)
//!   ├─ a pointing or image out of reach ─→ not applicable
//!   ├─ needed images empty ─→ [final_move(goal)]
//!   └─ otherwise ─→ [choose_next_image(analysis, best), achieve(goal)]
//!
//! choose_next_image ─→ [hunt_image(sat, dir, instrument, mode)]
//!   last_chance:  cheapest image exactly one satellite can still take
//!   cheapest:     minimum-cost entry of the best satellite's table
//!
//! hunt_image ─→ [switch_off?, switch_on?, move + calibrate?, move, take_image]
//! final_move ─→ [move(sat, dir) per goal pointing]
//! move       ─→ [] | [turn_to(sat, dir, current)]
//! ```
//!
//! The order in which the two `choose_next_image` alternatives are tried is
//! set by [`ChoicePolicy`].

use std::sync::Arc;

use tracing::warn;

use skyplan_kernel::carrier::world_state::WorldState;
use skyplan_kernel::cost::feasibility::{needed_images, options_costs};
use skyplan_kernel::error::StructuralError;
use skyplan_kernel::operators::action::Action;
use skyplan_search::contract::TaskV1;
use skyplan_search::method::{MethodRegistryError, MethodRegistryV1, Refinement};

use super::tasks::{SatTask, ACHIEVE, CHOOSE_NEXT_IMAGE, FINAL_MOVE, HUNT_IMAGE, MOVE};
use super::SatelliteDomain;
use crate::config::ChoicePolicy;

type MethodResult = Result<Refinement<SatelliteDomain>, StructuralError>;

pub const ACHIEVE_GOALS: &str = "achieve_goals";
pub const LAST_CHANCE: &str = "last_chance";
pub const CHEAPEST: &str = "cheapest";
pub const GO_TAKE_IMAGE: &str = "go_take_image";
pub const SLEW: &str = "slew";
pub const REACH_FINAL_POINTING: &str = "reach_final_pointing";

/// Method registry of the satellite domain.
///
/// # Errors
///
/// Returns [`MethodRegistryError`] if a method is declared twice (only
/// possible if the tables below are edited inconsistently).
pub fn method_registry(policy: ChoicePolicy) -> Result<MethodRegistryV1<SatelliteDomain>, MethodRegistryError> {
    let mut registry = MethodRegistryV1::new();
    registry.declare(ACHIEVE, ACHIEVE_GOALS, achieve_goals)?;
    match policy {
        ChoicePolicy::LastChanceThenCheapest => {
            registry.declare(CHOOSE_NEXT_IMAGE, LAST_CHANCE, last_chance)?;
            registry.declare(CHOOSE_NEXT_IMAGE, CHEAPEST, cheapest)?;
        }
        ChoicePolicy::CheapestThenLastChance => {
            registry.declare(CHOOSE_NEXT_IMAGE, CHEAPEST, cheapest)?;
            registry.declare(CHOOSE_NEXT_IMAGE, LAST_CHANCE, last_chance)?;
        }
        ChoicePolicy::CheapestOnly => {
            registry.declare(CHOOSE_NEXT_IMAGE, CHEAPEST, cheapest)?;
        }
    }
    registry.declare(HUNT_IMAGE, GO_TAKE_IMAGE, go_take_image)?;
    registry.declare(MOVE, SLEW, slew)?;
    registry.declare(FINAL_MOVE, REACH_FINAL_POINTING, reach_final_pointing)?;
    Ok(registry)
}

fn not_applicable(reason: impl Into<String>) -> MethodResult {
    Ok(Refinement::NotApplicable {
        reason: reason.into(),
    })
}

fn mismatch(method: &str, task: &SatTask) -> MethodResult {
    not_applicable(format!("{method} cannot refine {}", task.name()))
}

fn compound(task: SatTask) -> TaskV1<SatTask, Action> {
    TaskV1::Compound(task)
}

// ---------------------------------------------------------------------------
// achieve
// ---------------------------------------------------------------------------

fn achieve_goals(state: &WorldState, task: &SatTask) -> MethodResult {
    let SatTask::Achieve(goal) = task else {
        return mismatch(ACHIEVE_GOALS, task);
    };
    let needed = needed_images(state, goal);
    let analysis = options_costs(state, goal, &needed)?;

    let stranded = analysis.unreachable_pointings();
    if let Some(satellite) = stranded.first() {
        warn!(
            satellite = %satellite,
            stranded = stranded.len(),
            "goal pointing can no longer be reached"
        );
        return not_applicable(format!("{satellite} cannot reach its goal pointing"));
    }
    if needed.is_empty() {
        return Ok(Refinement::Subtasks(vec![compound(SatTask::FinalMove(Arc::clone(goal)))]));
    }

    let unachievable = analysis.unachievable_images();
    if let Some(image) = unachievable.first() {
        warn!(
            image = %image,
            unachievable = unachievable.len(),
            needed = needed.len(),
            "goal image can no longer be acquired by any satellite"
        );
        return not_applicable(format!("no satellite can acquire {image}"));
    }
    let Some(best) = analysis.cheapest_satellite().cloned() else {
        return not_applicable("no admitted acquisition");
    };

    Ok(Refinement::Subtasks(vec![
        compound(SatTask::ChooseNextImage {
            analysis: Arc::new(analysis),
            best,
        }),
        compound(SatTask::Achieve(Arc::clone(goal))),
    ]))
}

// ---------------------------------------------------------------------------
// choose_next_image
// ---------------------------------------------------------------------------

fn last_chance(_state: &WorldState, task: &SatTask) -> MethodResult {
    let SatTask::ChooseNextImage { analysis, .. } = task else {
        return mismatch(LAST_CHANCE, task);
    };
    let Some(option) = analysis.last_chance() else {
        return not_applicable("every needed image has several candidate satellites");
    };
    Ok(Refinement::Subtasks(vec![compound(SatTask::HuntImage {
        satellite: option.satellite.clone(),
        direction: option.image.direction.clone(),
        instrument: option.instrument.clone(),
        mode: option.image.mode.clone(),
    })]))
}

fn cheapest(_state: &WorldState, task: &SatTask) -> MethodResult {
    let SatTask::ChooseNextImage { analysis, best } = task else {
        return mismatch(CHEAPEST, task);
    };
    let Some((_, candidate)) = analysis.cheapest_entry(best) else {
        return not_applicable(format!("{best} has no admitted acquisition"));
    };
    Ok(Refinement::Subtasks(vec![compound(SatTask::HuntImage {
        satellite: best.clone(),
        direction: candidate.image.direction.clone(),
        instrument: candidate.instrument.clone(),
        mode: candidate.image.mode.clone(),
    })]))
}

// ---------------------------------------------------------------------------
// hunt_image / move / final_move
// ---------------------------------------------------------------------------

fn go_take_image(state: &WorldState, task: &SatTask) -> MethodResult {
    let SatTask::HuntImage {
        satellite,
        direction,
        instrument,
        mode,
    } = task
    else {
        return mismatch(GO_TAKE_IMAGE, task);
    };

    let mut subtasks = Vec::with_capacity(6);
    let powered = state.current_powered_instrument(satellite);
    if let Some(current) = powered.filter(|current| *current != instrument) {
        subtasks.push(TaskV1::Primitive(Action::SwitchOff {
            instrument: current.clone(),
            satellite: satellite.clone(),
        }));
    }
    if powered != Some(instrument) {
        subtasks.push(TaskV1::Primitive(Action::SwitchOn {
            instrument: instrument.clone(),
            satellite: satellite.clone(),
        }));
    }
    if !state.is_calibrated(instrument) || !state.power_on(instrument) {
        let target = state.tables().calibration_target(instrument).ok_or_else(|| {
            StructuralError::UnknownInstrument {
                instrument: instrument.clone(),
            }
        })?;
        subtasks.push(compound(SatTask::Move {
            satellite: satellite.clone(),
            direction: target.clone(),
        }));
        subtasks.push(TaskV1::Primitive(Action::Calibrate {
            satellite: satellite.clone(),
            instrument: instrument.clone(),
            direction: target.clone(),
        }));
    }
    subtasks.push(compound(SatTask::Move {
        satellite: satellite.clone(),
        direction: direction.clone(),
    }));
    subtasks.push(TaskV1::Primitive(Action::TakeImage {
        satellite: satellite.clone(),
        direction: direction.clone(),
        instrument: instrument.clone(),
        mode: mode.clone(),
    }));
    Ok(Refinement::Subtasks(subtasks))
}

fn slew(state: &WorldState, task: &SatTask) -> MethodResult {
    let SatTask::Move {
        satellite,
        direction,
    } = task
    else {
        return mismatch(SLEW, task);
    };
    let current = state
        .pointing(satellite)
        .ok_or_else(|| StructuralError::UnknownSatellite {
            satellite: satellite.clone(),
        })?;
    if current == direction {
        return Ok(Refinement::Subtasks(Vec::new()));
    }
    Ok(Refinement::Subtasks(vec![TaskV1::Primitive(Action::TurnTo {
        satellite: satellite.clone(),
        new: direction.clone(),
        prev: current.clone(),
    })]))
}

fn reach_final_pointing(_state: &WorldState, task: &SatTask) -> MethodResult {
    let SatTask::FinalMove(goal) = task else {
        return mismatch(REACH_FINAL_POINTING, task);
    };
    Ok(Refinement::Subtasks(
        goal.pointing()
            .iter()
            .map(|(satellite, direction)| {
                compound(SatTask::Move {
                    satellite: satellite.clone(),
                    direction: direction.clone(),
                })
            })
            .collect(),
    ))
}
