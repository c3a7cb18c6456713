//! `Goal`: the conjunction of final facts a plan must establish.

use crate::carrier::ids::{DirectionId, Image, SatelliteId};
use crate::carrier::world_state::WorldState;

/// Desired final pointings and required images.
///
/// Both parts keep declaration order. That order fixes the needed-image
/// traversal of the feasibility analysis and the order of final moves, which
/// is what makes plans reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Goal {
    pointing: Vec<(SatelliteId, DirectionId)>,
    have_image: Vec<Image>,
}

impl Goal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `satellite` to end up pointing at `direction`.
    ///
    /// A second requirement for the same satellite replaces the first in
    /// place.
    #[must_use]
    pub fn with_pointing(
        mut self,
        satellite: impl Into<SatelliteId>,
        direction: impl Into<DirectionId>,
    ) -> Self {
        let satellite = satellite.into();
        let direction = direction.into();
        match self.pointing.iter_mut().find(|(s, _)| *s == satellite) {
            Some(entry) => entry.1 = direction,
            None => self.pointing.push((satellite, direction)),
        }
        self
    }

    /// Require `image`. Duplicates are dropped.
    #[must_use]
    pub fn with_image(mut self, image: Image) -> Self {
        if !self.have_image.contains(&image) {
            self.have_image.push(image);
        }
        self
    }

    /// Final pointing requirements in declaration order.
    #[must_use]
    pub fn pointing(&self) -> &[(SatelliteId, DirectionId)] {
        &self.pointing
    }

    /// Required final direction of `satellite`, if any.
    #[must_use]
    pub fn pointing_for(&self, satellite: &SatelliteId) -> Option<&DirectionId> {
        self.pointing
            .iter()
            .find(|(s, _)| s == satellite)
            .map(|(_, d)| d)
    }

    /// Required images in declaration order.
    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.have_image
    }

    /// Images the state does not hold yet.
    #[must_use]
    pub fn missing_images(&self, state: &WorldState) -> Vec<Image> {
        self.have_image
            .iter()
            .filter(|img| !state.has_image(img))
            .cloned()
            .collect()
    }

    /// Satellites whose pointing differs from the requirement.
    #[must_use]
    pub fn mispointed(&self, state: &WorldState) -> Vec<SatelliteId> {
        self.pointing
            .iter()
            .filter(|(sat, dir)| state.pointing(sat) != Some(dir))
            .map(|(sat, _)| sat.clone())
            .collect()
    }

    #[must_use]
    pub fn is_satisfied_by(&self, state: &WorldState) -> bool {
        self.missing_images(state).is_empty() && self.mispointed(state).is_empty()
    }
}
