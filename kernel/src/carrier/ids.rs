//! Typed identifiers for the satellite world.
//!
//! Every object kind gets its own newtype so a direction can never be passed
//! where a mode is expected. Identifiers wrap a shared `Arc<str>`: cloning is
//! a reference-count bump, which keeps per-branch state snapshots cheap.
//!
//! Ordering is by name (byte order). Declaration order, where it matters for
//! determinism, is carried separately by [`super::world_state::StaticTables`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Declares a string-backed identifier newtype with `Display`, `From<&str>`
/// and transparent serde.
macro_rules! define_ids {
    (
        $(
            $(#[$meta:meta])*
            $name:ident
        ),+ $(,)?
    ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(Arc<str>);

            impl $name {
                /// Build an identifier from its name.
                #[must_use]
                pub fn new(name: &str) -> Self {
                    Self(Arc::from(name))
                }

                /// The identifier's name.
                #[must_use]
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(name: &str) -> Self {
                    Self::new(name)
                }
            }
        )+
    };
}

define_ids! {
    /// A satellite: carries instruments, fuel and data capacity.
    SatelliteId,
    /// An instrument mounted on exactly one satellite.
    InstrumentId,
    /// A pointing direction (imaging target or calibration target).
    DirectionId,
    /// An imaging mode supported by some instruments.
    ModeId,
}

/// An image: a `(direction, mode)` pair.
///
/// Acquisition is idempotent per pair, so an image is identified by the pair
/// alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Image {
    pub direction: DirectionId,
    pub mode: ModeId,
}

impl Image {
    #[must_use]
    pub fn new(direction: impl Into<DirectionId>, mode: impl Into<ModeId>) -> Self {
        Self {
            direction: direction.into(),
            mode: mode.into(),
        }
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.direction, self.mode)
    }
}
