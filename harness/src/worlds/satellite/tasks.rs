//! Compound tasks of the satellite domain.
//!
//! Scratch data (the feasibility analysis and the chosen satellite) travels
//! inside the `ChooseNextImage` task value. It is shared behind an `Arc`, so
//! choice-point snapshots of the agenda stay cheap.

use std::fmt;
use std::sync::Arc;

use skyplan_kernel::carrier::goal::Goal;
use skyplan_kernel::carrier::ids::{DirectionId, InstrumentId, ModeId, SatelliteId};
use skyplan_kernel::cost::feasibility::FeasibilityAnalysis;

pub const ACHIEVE: &str = "achieve";
pub const CHOOSE_NEXT_IMAGE: &str = "choose_next_image";
pub const HUNT_IMAGE: &str = "hunt_image";
pub const MOVE: &str = "move";
pub const FINAL_MOVE: &str = "final_move";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatTask {
    /// Acquire every goal image, then reach every goal pointing.
    Achieve(Arc<Goal>),
    /// Commit to one acquisition out of `analysis`.
    ChooseNextImage {
        analysis: Arc<FeasibilityAnalysis>,
        best: SatelliteId,
    },
    /// Power, calibrate, point and shoot.
    HuntImage {
        satellite: SatelliteId,
        direction: DirectionId,
        instrument: InstrumentId,
        mode: ModeId,
    },
    Move {
        satellite: SatelliteId,
        direction: DirectionId,
    },
    FinalMove(Arc<Goal>),
}

impl SatTask {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Achieve(_) => ACHIEVE,
            Self::ChooseNextImage { .. } => CHOOSE_NEXT_IMAGE,
            Self::HuntImage { .. } => HUNT_IMAGE,
            Self::Move { .. } => MOVE,
            Self::FinalMove(_) => FINAL_MOVE,
        }
    }
}

impl fmt::Display for SatTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Achieve(goal) | Self::FinalMove(goal) => write!(
                f,
                "{}({} images, {} pointings)",
                self.name(),
                goal.images().len(),
                goal.pointing().len()
            ),
            Self::ChooseNextImage { analysis, best } => write!(
                f,
                "{CHOOSE_NEXT_IMAGE}({} needed, best {best})",
                analysis.needed().len()
            ),
            Self::HuntImage {
                satellite,
                direction,
                instrument,
                mode,
            } => write!(f, "{HUNT_IMAGE}({satellite}, {direction}, {instrument}, {mode})"),
            Self::Move {
                satellite,
                direction,
            } => write!(f, "{MOVE}({satellite}, {direction})"),
        }
    }
}
