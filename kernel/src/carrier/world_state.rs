//! `WorldState`: the typed aggregate every action reads and mutates.
//!
//! The state is split in two:
//!
//! - [`StaticTables`]: facts that never change during planning (which
//!   instrument sits on which satellite, supported modes, calibration
//!   targets, slew and data tables). Shared read-only behind an `Arc`.
//! - [`WorldState`]: the mutable facts (pointing, power, calibration,
//!   resources, acquired images). Cloned once per search choice point; the
//!   clone shares the static tables.
//!
//! Power is stored once, as `powered: satellite -> Option<instrument>`.
//! `power_avail` and `power_on` are derived from it, so "at most one
//! instrument powered per satellite" and "`power_avail` iff nothing powered"
//! hold by construction.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::carrier::ids::{DirectionId, Image, InstrumentId, ModeId, SatelliteId};

/// Read-only problem tables.
///
/// Declaration-order vectors fix every iteration order the planner depends
/// on; the maps are keyed by name for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticTables {
    pub(crate) satellites: Vec<SatelliteId>,
    pub(crate) instruments: Vec<InstrumentId>,
    pub(crate) directions: Vec<DirectionId>,
    pub(crate) modes: Vec<ModeId>,
    pub(crate) on_board: BTreeMap<InstrumentId, SatelliteId>,
    pub(crate) instruments_on: BTreeMap<SatelliteId, Vec<InstrumentId>>,
    pub(crate) supports: BTreeMap<InstrumentId, BTreeSet<ModeId>>,
    pub(crate) calibration_target: BTreeMap<InstrumentId, DirectionId>,
    pub(crate) slew_time: BTreeMap<(DirectionId, DirectionId), u64>,
    pub(crate) data: BTreeMap<Image, u64>,
}

impl StaticTables {
    /// Satellites in declaration order.
    #[must_use]
    pub fn satellites(&self) -> &[SatelliteId] {
        &self.satellites
    }

    /// Instruments in declaration order.
    #[must_use]
    pub fn instruments(&self) -> &[InstrumentId] {
        &self.instruments
    }

    /// Directions in declaration order.
    #[must_use]
    pub fn directions(&self) -> &[DirectionId] {
        &self.directions
    }

    /// Modes in declaration order.
    #[must_use]
    pub fn modes(&self) -> &[ModeId] {
        &self.modes
    }

    #[must_use]
    pub fn has_satellite(&self, satellite: &SatelliteId) -> bool {
        self.instruments_on.contains_key(satellite)
    }

    #[must_use]
    pub fn has_direction(&self, direction: &DirectionId) -> bool {
        self.directions.contains(direction)
    }

    #[must_use]
    pub fn has_mode(&self, mode: &ModeId) -> bool {
        self.modes.contains(mode)
    }

    /// The satellite an instrument is mounted on.
    #[must_use]
    pub fn on_board(&self, instrument: &InstrumentId) -> Option<&SatelliteId> {
        self.on_board.get(instrument)
    }

    /// Instruments mounted on `satellite`, in declaration order.
    #[must_use]
    pub fn instruments_on(&self, satellite: &SatelliteId) -> &[InstrumentId] {
        self.instruments_on
            .get(satellite)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn supports(&self, instrument: &InstrumentId, mode: &ModeId) -> bool {
        self.supports
            .get(instrument)
            .is_some_and(|modes| modes.contains(mode))
    }

    #[must_use]
    pub fn calibration_target(&self, instrument: &InstrumentId) -> Option<&DirectionId> {
        self.calibration_target.get(instrument)
    }

    /// Slew cost between two directions. `None` if the table has no entry
    /// (equal directions are never looked up here).
    #[must_use]
    pub fn slew_time(&self, from: &DirectionId, to: &DirectionId) -> Option<u64> {
        self.slew_time.get(&(from.clone(), to.clone())).copied()
    }

    /// Data volume of an image.
    #[must_use]
    pub fn data(&self, image: &Image) -> Option<u64> {
        self.data.get(image).copied()
    }
}

/// Per-satellite initial conditions used by [`WorldState::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SatelliteInit {
    pub pointing: DirectionId,
    pub powered: Option<InstrumentId>,
    pub fuel: u64,
    pub data_capacity: u64,
}

/// The mutable world state of one search branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldState {
    tables: Arc<StaticTables>,
    pointing: BTreeMap<SatelliteId, DirectionId>,
    powered: BTreeMap<SatelliteId, Option<InstrumentId>>,
    calibrated: BTreeSet<InstrumentId>,
    fuel: BTreeMap<SatelliteId, u64>,
    data_capacity: BTreeMap<SatelliteId, u64>,
    have_image: BTreeSet<Image>,
    fuel_used: u64,
    data_stored: u64,
}

impl WorldState {
    /// Build a state from validated tables and per-satellite conditions.
    ///
    /// Only `compile` calls this; it has already checked every reference.
    pub(crate) fn new(
        tables: Arc<StaticTables>,
        satellites: BTreeMap<SatelliteId, SatelliteInit>,
        calibrated: BTreeSet<InstrumentId>,
        have_image: BTreeSet<Image>,
    ) -> Self {
        let mut pointing = BTreeMap::new();
        let mut powered = BTreeMap::new();
        let mut fuel = BTreeMap::new();
        let mut data_capacity = BTreeMap::new();
        for (sat, init) in satellites {
            pointing.insert(sat.clone(), init.pointing);
            powered.insert(sat.clone(), init.powered);
            fuel.insert(sat.clone(), init.fuel);
            data_capacity.insert(sat, init.data_capacity);
        }
        Self {
            tables,
            pointing,
            powered,
            calibrated,
            fuel,
            data_capacity,
            have_image,
            fuel_used: 0,
            data_stored: 0,
        }
    }

    /// The shared static tables.
    #[must_use]
    pub fn tables(&self) -> &StaticTables {
        &self.tables
    }

    /// The shared static tables as an `Arc` (for building sibling states).
    #[must_use]
    pub fn tables_arc(&self) -> Arc<StaticTables> {
        Arc::clone(&self.tables)
    }

    #[must_use]
    pub fn pointing(&self, satellite: &SatelliteId) -> Option<&DirectionId> {
        self.pointing.get(satellite)
    }

    /// The instrument currently powered on `satellite`, if any.
    #[must_use]
    pub fn current_powered_instrument(&self, satellite: &SatelliteId) -> Option<&InstrumentId> {
        self.powered.get(satellite).and_then(Option::as_ref)
    }

    /// `true` iff `satellite` exists and has no instrument powered.
    #[must_use]
    pub fn power_avail(&self, satellite: &SatelliteId) -> bool {
        matches!(self.powered.get(satellite), Some(None))
    }

    /// `true` iff `instrument` is the powered instrument of its satellite.
    #[must_use]
    pub fn power_on(&self, instrument: &InstrumentId) -> bool {
        self.tables
            .on_board(instrument)
            .and_then(|sat| self.current_powered_instrument(sat))
            == Some(instrument)
    }

    #[must_use]
    pub fn is_calibrated(&self, instrument: &InstrumentId) -> bool {
        self.calibrated.contains(instrument)
    }

    #[must_use]
    pub fn fuel(&self, satellite: &SatelliteId) -> Option<u64> {
        self.fuel.get(satellite).copied()
    }

    #[must_use]
    pub fn data_capacity(&self, satellite: &SatelliteId) -> Option<u64> {
        self.data_capacity.get(satellite).copied()
    }

    #[must_use]
    pub fn has_image(&self, image: &Image) -> bool {
        self.have_image.contains(image)
    }

    /// Acquired images, ordered by `(direction, mode)`.
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.have_image.iter()
    }

    /// Total fuel spent by every applied `turn_to`.
    #[must_use]
    pub fn fuel_used(&self) -> u64 {
        self.fuel_used
    }

    /// Total data stored by every applied `take_image`.
    #[must_use]
    pub fn data_stored(&self) -> u64 {
        self.data_stored
    }

    /// JSON view of the mutable facts, keyed and ordered for canonical hashing.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let satellites: Vec<serde_json::Value> = self
            .tables
            .satellites
            .iter()
            .map(|sat| {
                serde_json::json!({
                    "data_capacity": self.data_capacity(sat),
                    "fuel": self.fuel(sat),
                    "name": sat.as_str(),
                    "pointing": self.pointing(sat).map(DirectionId::as_str),
                    "powered": self.current_powered_instrument(sat).map(InstrumentId::as_str),
                })
            })
            .collect();
        let calibrated: Vec<&str> = self.calibrated.iter().map(InstrumentId::as_str).collect();
        let images: Vec<serde_json::Value> = self
            .have_image
            .iter()
            .map(|img| serde_json::json!([img.direction.as_str(), img.mode.as_str()]))
            .collect();
        serde_json::json!({
            "calibrated": calibrated,
            "data_stored": self.data_stored,
            "fuel_used": self.fuel_used,
            "have_image": images,
            "satellites": satellites,
        })
    }

    // -----------------------------------------------------------------------
    // Mutators: crate-private, used only by `operators::apply` after every
    // precondition has been checked.
    // -----------------------------------------------------------------------

    pub(crate) fn set_pointing(&mut self, satellite: &SatelliteId, direction: DirectionId) {
        self.pointing.insert(satellite.clone(), direction);
    }

    pub(crate) fn set_powered(&mut self, satellite: &SatelliteId, instrument: Option<InstrumentId>) {
        self.powered.insert(satellite.clone(), instrument);
    }

    pub(crate) fn set_calibrated(&mut self, instrument: &InstrumentId, calibrated: bool) {
        if calibrated {
            self.calibrated.insert(instrument.clone());
        } else {
            self.calibrated.remove(instrument);
        }
    }

    /// Callers check `fuel >= amount` first.
    pub(crate) fn spend_fuel(&mut self, satellite: &SatelliteId, amount: u64) {
        if let Some(fuel) = self.fuel.get_mut(satellite) {
            *fuel = fuel.saturating_sub(amount);
        }
        self.fuel_used = self.fuel_used.saturating_add(amount);
    }

    /// Callers check `data_capacity >= amount` first.
    pub(crate) fn store_image(&mut self, satellite: &SatelliteId, image: Image, amount: u64) {
        if let Some(capacity) = self.data_capacity.get_mut(satellite) {
            *capacity = capacity.saturating_sub(amount);
        }
        self.have_image.insert(image);
        self.data_stored = self.data_stored.saturating_add(amount);
    }
}
