//! Structural errors: malformed static data discovered while planning.
//!
//! A structural error is fatal. It is never a reason to backtrack: the same
//! lookup would fail on every branch.

use crate::carrier::ids::{DirectionId, Image, InstrumentId, SatelliteId};

/// Malformed or missing static data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// No `slew_time` entry for an unequal direction pair.
    #[error("missing slew_time entry for ({from}, {to})")]
    MissingCostEntry { from: DirectionId, to: DirectionId },

    /// No `data` entry for an image that has to be stored.
    #[error("missing data entry for image {image}")]
    MissingDataEntry { image: Image },

    /// A satellite referenced by a task or goal is not part of the problem.
    #[error("unknown satellite {satellite}")]
    UnknownSatellite { satellite: SatelliteId },

    /// An instrument referenced by a task is not part of the problem.
    #[error("unknown instrument {instrument}")]
    UnknownInstrument { instrument: InstrumentId },
}
