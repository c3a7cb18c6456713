//! Feasibility analysis: which satellite can still take which needed image.
//!
//! [`options_costs`] costs every (satellite, needed image) pair and admits
//! the pair only if the satellite keeps enough fuel for its final
//! repositioning and has room for the image. The result is a plain value:
//! it is never stored on `WorldState`, so nothing leaks between branches.
//!
//! A goal-pointed satellite with no admitted option is frozen: nothing in
//! the rest of the plan moves it except the final move. If its fuel does not
//! cover that move it is reported by
//! [`FeasibilityAnalysis::unreachable_pointings`].
//!
//! Traversal order is fixed: satellites in declaration order, needed images
//! in goal order. Every table below is reproducible from that order alone.

use std::collections::BTreeMap;

use crate::carrier::goal::Goal;
use crate::carrier::ids::{Image, InstrumentId, SatelliteId};
use crate::carrier::world_state::WorldState;
use crate::cost::model::{acquisition_cost, end_position_cost};
use crate::error::StructuralError;

/// One admitted acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionOptionV1 {
    pub satellite: SatelliteId,
    pub image: Image,
    pub instrument: InstrumentId,
    pub cost: u64,
}

/// The entry a per-satellite cost table keeps for one cost value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateV1 {
    pub image: Image,
    pub instrument: InstrumentId,
}

/// Scratch data of one `achieve` refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeasibilityAnalysis {
    needed: Vec<Image>,
    /// Admitted options in traversal order.
    options: Vec<AcquisitionOptionV1>,
    /// satellite → cost → candidate. On equal cost the later image wins.
    costs: BTreeMap<SatelliteId, BTreeMap<u64, CandidateV1>>,
    /// needed image → satellites with an admitted option, declaration order.
    achievable_by: BTreeMap<Image, Vec<SatelliteId>>,
    /// Frozen satellites that cannot afford their final move.
    unreachable_pointings: Vec<SatelliteId>,
    satellites: Vec<SatelliteId>,
}

/// Goal images the state does not hold yet, in goal order.
#[must_use]
pub fn needed_images(state: &WorldState, goal: &Goal) -> Vec<Image> {
    goal.missing_images(state)
}

/// Cost and filter every (satellite, needed image) acquisition.
///
/// An option is admitted iff
/// `fuel >= cost + end_position_cost(image.direction)` and
/// `data_capacity >= data[image]`.
///
/// # Errors
///
/// Returns a [`StructuralError`] if a slew entry needed for costing is
/// missing, or if an image some satellite could acquire has no `data` entry.
/// A frozen goal-pointed satellite also needs the entry from its current to
/// its required direction.
pub fn options_costs(
    state: &WorldState,
    goal: &Goal,
    needed: &[Image],
) -> Result<FeasibilityAnalysis, StructuralError> {
    let tables = state.tables();
    let satellites = tables.satellites().to_vec();
    let mut options = Vec::new();
    let mut unreachable_pointings = Vec::new();
    let mut costs: BTreeMap<SatelliteId, BTreeMap<u64, CandidateV1>> = BTreeMap::new();
    let mut achievable_by: BTreeMap<Image, Vec<SatelliteId>> =
        needed.iter().map(|img| (img.clone(), Vec::new())).collect();

    for satellite in &satellites {
        let table = costs.entry(satellite.clone()).or_default();
        let fuel = state.fuel(satellite).unwrap_or(0);
        let capacity = state.data_capacity(satellite).unwrap_or(0);
        let mut admitted_any = false;

        for image in needed {
            let Some(acquisition) = acquisition_cost(state, satellite, image)? else {
                continue;
            };
            let reserve = end_position_cost(state, goal, satellite, &image.direction)?;
            let size = tables
                .data(image)
                .ok_or_else(|| StructuralError::MissingDataEntry {
                    image: image.clone(),
                })?;
            if fuel < acquisition.cost.saturating_add(reserve) || capacity < size {
                continue;
            }

            table.insert(
                acquisition.cost,
                CandidateV1 {
                    image: image.clone(),
                    instrument: acquisition.instrument.clone(),
                },
            );
            if let Some(sats) = achievable_by.get_mut(image) {
                sats.push(satellite.clone());
            }
            options.push(AcquisitionOptionV1 {
                satellite: satellite.clone(),
                image: image.clone(),
                instrument: acquisition.instrument,
                cost: acquisition.cost,
            });
            admitted_any = true;
        }

        if !admitted_any && goal.pointing_for(satellite).is_some() {
            let current = state
                .pointing(satellite)
                .ok_or_else(|| StructuralError::UnknownSatellite {
                    satellite: satellite.clone(),
                })?;
            if fuel < end_position_cost(state, goal, satellite, current)? {
                unreachable_pointings.push(satellite.clone());
            }
        }
    }

    Ok(FeasibilityAnalysis {
        needed: needed.to_vec(),
        options,
        costs,
        achievable_by,
        unreachable_pointings,
        satellites,
    })
}

/// [`needed_images`] followed by [`options_costs`].
///
/// # Errors
///
/// Same as [`options_costs`].
pub fn analyze(state: &WorldState, goal: &Goal) -> Result<FeasibilityAnalysis, StructuralError> {
    let needed = needed_images(state, goal);
    options_costs(state, goal, &needed)
}

impl FeasibilityAnalysis {
    /// Needed images in goal order.
    #[must_use]
    pub fn needed(&self) -> &[Image] {
        &self.needed
    }

    /// Admitted options in traversal order.
    #[must_use]
    pub fn options(&self) -> &[AcquisitionOptionV1] {
        &self.options
    }

    /// Cost table of `satellite` (empty if it has no admitted option).
    #[must_use]
    pub fn cost_table(&self, satellite: &SatelliteId) -> Option<&BTreeMap<u64, CandidateV1>> {
        self.costs.get(satellite)
    }

    /// Satellites with an admitted option for `image`.
    #[must_use]
    pub fn achievable_by(&self, image: &Image) -> &[SatelliteId] {
        self.achievable_by.get(image).map_or(&[], Vec::as_slice)
    }

    /// Needed images no satellite can acquire, in goal order.
    #[must_use]
    pub fn unachievable_images(&self) -> Vec<Image> {
        self.needed
            .iter()
            .filter(|img| self.achievable_by(img).is_empty())
            .cloned()
            .collect()
    }

    /// Goal-pointed satellites with no admitted option and too little fuel
    /// to slew from where they point now to their required direction, in
    /// declaration order. Any plan from this state misses their pointing.
    #[must_use]
    pub fn unreachable_pointings(&self) -> &[SatelliteId] {
        &self.unreachable_pointings
    }

    /// The satellite with the lowest minimum admitted cost. Ties go to the
    /// satellite declared first. `None` if nothing was admitted.
    #[must_use]
    pub fn cheapest_satellite(&self) -> Option<&SatelliteId> {
        let mut best: Option<(&SatelliteId, u64)> = None;
        for satellite in &self.satellites {
            let Some(min) = self
                .costs
                .get(satellite)
                .and_then(|table| table.keys().next().copied())
            else {
                continue;
            };
            if best.map_or(true, |(_, b)| min < b) {
                best = Some((satellite, min));
            }
        }
        best.map(|(sat, _)| sat)
    }

    /// Minimum-cost entry of `satellite`'s table.
    #[must_use]
    pub fn cheapest_entry(&self, satellite: &SatelliteId) -> Option<(u64, &CandidateV1)> {
        self.costs
            .get(satellite)
            .and_then(|table| table.iter().next())
            .map(|(cost, candidate)| (*cost, candidate))
    }

    /// The cheapest admitted option for `image` (first in traversal order on
    /// ties).
    #[must_use]
    pub fn cheapest_option_for(&self, image: &Image) -> Option<&AcquisitionOptionV1> {
        let mut best: Option<&AcquisitionOptionV1> = None;
        for option in self.options.iter().filter(|o| &o.image == image) {
            if best.map_or(true, |b| option.cost < b.cost) {
                best = Some(option);
            }
        }
        best
    }

    /// The cheapest option among needed images exactly one satellite can
    /// acquire. Equal costs go to the image earlier in goal order.
    #[must_use]
    pub fn last_chance(&self) -> Option<&AcquisitionOptionV1> {
        let mut best: Option<&AcquisitionOptionV1> = None;
        for image in self.needed.iter().filter(|img| self.achievable_by(img).len() == 1) {
            let Some(option) = self.cheapest_option_for(image) else {
                continue;
            };
            if best.map_or(true, |b| option.cost < b.cost) {
                best = Some(option);
            }
        }
        best
    }

    /// JSON view (cost tables keyed by satellite, options in traversal order).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let image_json = |img: &Image| serde_json::json!([img.direction.as_str(), img.mode.as_str()]);
        let costs: serde_json::Map<String, serde_json::Value> = self
            .costs
            .iter()
            .map(|(sat, table)| {
                let rows: Vec<serde_json::Value> = table
                    .iter()
                    .map(|(cost, c)| {
                        serde_json::json!({
                            "cost": cost,
                            "image": image_json(&c.image),
                            "instrument": c.instrument.as_str(),
                        })
                    })
                    .collect();
                (sat.to_string(), serde_json::Value::Array(rows))
            })
            .collect();
        let options: Vec<serde_json::Value> = self
            .options
            .iter()
            .map(|o| {
                serde_json::json!({
                    "cost": o.cost,
                    "image": image_json(&o.image),
                    "instrument": o.instrument.as_str(),
                    "satellite": o.satellite.as_str(),
                })
            })
            .collect();
        let needed: Vec<serde_json::Value> = self.needed.iter().map(image_json).collect();
        let stranded: Vec<&str> = self.unreachable_pointings.iter().map(SatelliteId::as_str).collect();
        serde_json::json!({
            "costs": costs,
            "needed": needed,
            "options": options,
            "unreachable_pointings": stranded,
        })
    }
}
