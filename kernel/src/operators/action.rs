//! `Action`: the five primitive actions of the satellite world.
//!
//! Each variant carries its typed arguments in the order of the action's
//! wire form, e.g. `turn_to(sat, new, prev)`. The wire form (name plus
//! string arguments) is what plan digests and replay fixtures commit to.

use std::fmt;

use crate::carrier::ids::{DirectionId, Image, InstrumentId, ModeId, SatelliteId};
use crate::operators::operator_registry::ActionRegistryV1;

pub const TURN_TO: &str = "turn_to";
pub const SWITCH_ON: &str = "switch_on";
pub const SWITCH_OFF: &str = "switch_off";
pub const CALIBRATE: &str = "calibrate";
pub const TAKE_IMAGE: &str = "take_image";

/// A ground primitive action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    TurnTo {
        satellite: SatelliteId,
        new: DirectionId,
        prev: DirectionId,
    },
    SwitchOn {
        instrument: InstrumentId,
        satellite: SatelliteId,
    },
    SwitchOff {
        instrument: InstrumentId,
        satellite: SatelliteId,
    },
    Calibrate {
        satellite: SatelliteId,
        instrument: InstrumentId,
        direction: DirectionId,
    },
    TakeImage {
        satellite: SatelliteId,
        direction: DirectionId,
        instrument: InstrumentId,
        mode: ModeId,
    },
}

impl Action {
    /// The action name as declared in the registry.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TurnTo { .. } => TURN_TO,
            Self::SwitchOn { .. } => SWITCH_ON,
            Self::SwitchOff { .. } => SWITCH_OFF,
            Self::Calibrate { .. } => CALIBRATE,
            Self::TakeImage { .. } => TAKE_IMAGE,
        }
    }

    /// Arguments in wire order.
    #[must_use]
    pub fn args(&self) -> Vec<&str> {
        match self {
            Self::TurnTo {
                satellite,
                new,
                prev,
            } => vec![satellite.as_str(), new.as_str(), prev.as_str()],
            Self::SwitchOn {
                instrument,
                satellite,
            }
            | Self::SwitchOff {
                instrument,
                satellite,
            } => vec![instrument.as_str(), satellite.as_str()],
            Self::Calibrate {
                satellite,
                instrument,
                direction,
            } => vec![satellite.as_str(), instrument.as_str(), direction.as_str()],
            Self::TakeImage {
                satellite,
                direction,
                instrument,
                mode,
            } => vec![
                satellite.as_str(),
                direction.as_str(),
                instrument.as_str(),
                mode.as_str(),
            ],
        }
    }

    /// The satellite the action operates on.
    #[must_use]
    pub fn satellite(&self) -> &SatelliteId {
        match self {
            Self::TurnTo { satellite, .. }
            | Self::SwitchOn { satellite, .. }
            | Self::SwitchOff { satellite, .. }
            | Self::Calibrate { satellite, .. }
            | Self::TakeImage { satellite, .. } => satellite,
        }
    }

    /// The image a `take_image` acquires.
    #[must_use]
    pub fn image(&self) -> Option<Image> {
        match self {
            Self::TakeImage {
                direction, mode, ..
            } => Some(Image {
                direction: direction.clone(),
                mode: mode.clone(),
            }),
            _ => None,
        }
    }

    /// Wire form: `[name, arg0, arg1, ...]`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut parts = vec![serde_json::Value::from(self.name())];
        parts.extend(self.args().into_iter().map(serde_json::Value::from));
        serde_json::Value::Array(parts)
    }

    /// Rebuild an action from its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`ActionParseError::UnknownAction`] if `registry` does not
    /// declare `name`, or [`ActionParseError::ArityMismatch`] if the number of
    /// arguments differs from the declared arity.
    pub fn from_parts(
        name: &str,
        args: &[&str],
        registry: &ActionRegistryV1,
    ) -> Result<Self, ActionParseError> {
        let entry = registry
            .get(name)
            .ok_or_else(|| ActionParseError::UnknownAction {
                name: name.to_string(),
            })?;
        if args.len() != entry.arity {
            return Err(ActionParseError::ArityMismatch {
                name: name.to_string(),
                expected: entry.arity,
                actual: args.len(),
            });
        }
        let action = match (name, args) {
            (TURN_TO, [sat, new, prev]) => Self::TurnTo {
                satellite: SatelliteId::new(sat),
                new: DirectionId::new(new),
                prev: DirectionId::new(prev),
            },
            (SWITCH_ON, [instr, sat]) => Self::SwitchOn {
                instrument: InstrumentId::new(instr),
                satellite: SatelliteId::new(sat),
            },
            (SWITCH_OFF, [instr, sat]) => Self::SwitchOff {
                instrument: InstrumentId::new(instr),
                satellite: SatelliteId::new(sat),
            },
            (CALIBRATE, [sat, instr, dir]) => Self::Calibrate {
                satellite: SatelliteId::new(sat),
                instrument: InstrumentId::new(instr),
                direction: DirectionId::new(dir),
            },
            (TAKE_IMAGE, [sat, dir, instr, mode]) => Self::TakeImage {
                satellite: SatelliteId::new(sat),
                direction: DirectionId::new(dir),
                instrument: InstrumentId::new(instr),
                mode: ModeId::new(mode),
            },
            // Declared in the registry but not one of the kernel's actions.
            _ => {
                return Err(ActionParseError::UnknownAction {
                    name: name.to_string(),
                })
            }
        };
        Ok(action)
    }

    /// Rebuild an action from its JSON wire form (see [`Action::to_json`]).
    ///
    /// # Errors
    ///
    /// Returns [`ActionParseError::Malformed`] if `value` is not a non-empty
    /// array of strings, plus any error of [`Action::from_parts`].
    pub fn from_json(
        value: &serde_json::Value,
        registry: &ActionRegistryV1,
    ) -> Result<Self, ActionParseError> {
        let malformed = || ActionParseError::Malformed {
            detail: value.to_string(),
        };
        let parts = value.as_array().ok_or_else(malformed)?;
        let strings = parts
            .iter()
            .map(serde_json::Value::as_str)
            .collect::<Option<Vec<&str>>>()
            .ok_or_else(malformed)?;
        let (name, args) = strings.split_first().ok_or_else(malformed)?;
        Self::from_parts(name, args, registry)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.args().join(", "))
    }
}

/// Failure to rebuild an [`Action`] from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    #[error("unknown action {name:?}")]
    UnknownAction { name: String },

    #[error("{name} expects {expected} arguments, got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("malformed action: {detail}")]
    Malformed { detail: String },
}
