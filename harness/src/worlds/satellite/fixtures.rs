//! Canonical satellite problems shared by unit tests, lock tests and
//! benchmarks.
//!
//! Each fixture is a plain [`ProblemV1`]; callers compile it themselves.

use skyplan_kernel::carrier::compile::{
    DataEntryV1, GoalSpecV1, ImageSpecV1, InstrumentSpecV1, PointingGoalV1, ProblemV1, SatelliteSpecV1,
    SlewEntryV1,
};

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn instrument(name: &str, supports: &[&str], calibration_target: &str) -> InstrumentSpecV1 {
    InstrumentSpecV1 {
        name: name.into(),
        supports: names(supports),
        calibration_target: calibration_target.into(),
        calibrated: false,
    }
}

fn satellite(name: &str, pointing: &str, fuel: u64, data_capacity: u64, instruments: Vec<InstrumentSpecV1>) -> SatelliteSpecV1 {
    SatelliteSpecV1 {
        name: name.into(),
        pointing: pointing.into(),
        fuel,
        data_capacity,
        instruments,
        powered: None,
    }
}

fn slew(from: &str, to: &str, cost: u64) -> SlewEntryV1 {
    SlewEntryV1 {
        from: from.into(),
        to: to.into(),
        cost,
    }
}

fn data(direction: &str, mode: &str, size: u64) -> DataEntryV1 {
    DataEntryV1 {
        direction: direction.into(),
        mode: mode.into(),
        size,
    }
}

fn image(direction: &str, mode: &str) -> ImageSpecV1 {
    ImageSpecV1 {
        direction: direction.into(),
        mode: mode.into(),
    }
}

fn pointing(satellite: &str, direction: &str) -> PointingGoalV1 {
    PointingGoalV1 {
        satellite: satellite.into(),
        direction: direction.into(),
    }
}

/// One satellite at its calibration target, one image one slew away.
///
/// Expected plan: `switch_on(i1, s1)`, `calibrate(s1, i1, d0)`,
/// `turn_to(s1, d1, d0)`, `take_image(s1, d1, i1, m1)`.
#[must_use]
pub fn single_satellite() -> ProblemV1 {
    ProblemV1 {
        directions: names(&["d0", "d1"]),
        modes: names(&["m1"]),
        satellites: vec![satellite("s1", "d0", 10, 10, vec![instrument("i1", &["m1"], "d0")])],
        slew_time: vec![slew("d0", "d1", 3)],
        data: vec![data("d1", "m1", 2)],
        have_image: Vec::new(),
        goal: GoalSpecV1 {
            pointing: Vec::new(),
            have_image: vec![image("d1", "m1")],
        },
    }
}

/// The only capable satellite can reach the image (3 fuel of 4) but could
/// not return to its required final pointing afterwards (3 more).
#[must_use]
pub fn fuel_starved() -> ProblemV1 {
    let mut problem = single_satellite();
    problem.satellites[0].fuel = 4;
    problem.goal.pointing = vec![pointing("s1", "d0")];
    problem
}

/// Two satellites, each the only taker of one image. `(d2, m2)` on `s2` is
/// cheaper than `(d1, m1)` on `s1` and is listed second in the goal. Both
/// satellites must end pointing at `d0`.
#[must_use]
pub fn two_satellites() -> ProblemV1 {
    ProblemV1 {
        directions: names(&["d0", "d1", "d2"]),
        modes: names(&["m1", "m2"]),
        satellites: vec![
            satellite("s1", "d0", 20, 10, vec![instrument("i1", &["m1"], "d0")]),
            satellite("s2", "d0", 20, 10, vec![instrument("i2", &["m2"], "d0")]),
        ],
        slew_time: vec![slew("d0", "d1", 5), slew("d0", "d2", 2), slew("d1", "d2", 4)],
        data: vec![data("d1", "m1", 1), data("d2", "m2", 1)],
        have_image: Vec::new(),
        goal: GoalSpecV1 {
            pointing: vec![pointing("s1", "d0"), pointing("s2", "d0")],
            have_image: vec![image("d1", "m1"), image("d2", "m2")],
        },
    }
}

/// `(d1, m1)` can be taken by both satellites, `(d2, m1)` only by `s2`
/// (`s1` lacks the fuel). `s1` and `s2` tie on their cheapest option.
#[must_use]
pub fn contested() -> ProblemV1 {
    ProblemV1 {
        directions: names(&["d0", "d1", "d2"]),
        modes: names(&["m1"]),
        satellites: vec![
            satellite("s1", "d0", 2, 10, vec![instrument("i1", &["m1"], "d0")]),
            satellite("s2", "d0", 10, 10, vec![instrument("i2", &["m1"], "d0")]),
        ],
        slew_time: vec![slew("d0", "d1", 1), slew("d0", "d2", 3), slew("d1", "d2", 3)],
        data: vec![data("d1", "m1", 1), data("d2", "m1", 1)],
        have_image: Vec::new(),
        goal: GoalSpecV1 {
            pointing: Vec::new(),
            have_image: vec![image("d1", "m1"), image("d2", "m1")],
        },
    }
}

/// One image, two equally able satellites.
#[must_use]
pub fn shared_target() -> ProblemV1 {
    ProblemV1 {
        directions: names(&["d0", "d1"]),
        modes: names(&["m1"]),
        satellites: vec![
            satellite("s1", "d0", 10, 10, vec![instrument("i1", &["m1"], "d0")]),
            satellite("s2", "d1", 10, 10, vec![instrument("i2", &["m1"], "d1")]),
        ],
        slew_time: vec![slew("d0", "d1", 2)],
        data: vec![data("d1", "m1", 1)],
        have_image: Vec::new(),
        goal: GoalSpecV1 {
            pointing: Vec::new(),
            have_image: vec![image("d1", "m1")],
        },
    }
}

/// Greedy choice walks into a dead end. `s1` can take `(d1, m1)` cheaply
/// or `(d2, m2)`, but not both; `(d2, m2)` has no other taker while `s2`
/// can also take `(d1, m1)`.
///
/// Cheapest-first takes `(d1, m1)` on `s1`, finds `(d2, m2)` out of reach,
/// and must backtrack to the last-chance alternative.
#[must_use]
pub fn greedy_trap() -> ProblemV1 {
    ProblemV1 {
        directions: names(&["d0", "d1", "d2"]),
        modes: names(&["m1", "m2"]),
        satellites: vec![
            satellite("s1", "d0", 3, 10, vec![instrument("i1", &["m1", "m2"], "d0")]),
            satellite("s2", "d0", 10, 10, vec![instrument("i2", &["m1"], "d0")]),
        ],
        slew_time: vec![slew("d0", "d1", 1), slew("d0", "d2", 3), slew("d1", "d2", 5)],
        data: vec![data("d1", "m1", 1), data("d2", "m2", 1)],
        have_image: Vec::new(),
        goal: GoalSpecV1 {
            pointing: Vec::new(),
            have_image: vec![image("d1", "m1"), image("d2", "m2")],
        },
    }
}

/// `s1` must take `images` images, each of which only it can take, while
/// `s2` (no goal image, fuel 0) must end at `far`, 5 away.
///
/// No plan exists. The shortfall is visible from the initial state, so the
/// search gives up without trying any image order.
#[must_use]
pub fn stranded_pointing(images: usize) -> ProblemV1 {
    let mut directions: Vec<String> = (0..=images).map(|d| format!("d{d}")).collect();
    let mut slew_time = Vec::new();
    for from in 0..=images {
        for to in from + 1..=images {
            slew_time.push(slew(&directions[from], &directions[to], 1));
        }
        slew_time.push(slew(&directions[from], "far", 5));
    }
    directions.push("far".into());

    let data_entries = (1..=images).map(|k| data(&format!("d{k}"), "m1", 1)).collect();
    let goal_images = (1..=images).map(|k| image(&format!("d{k}"), "m1")).collect();

    ProblemV1 {
        directions,
        modes: names(&["m1", "m2"]),
        satellites: vec![
            satellite("s1", "d0", 10_000, 10_000, vec![instrument("i1", &["m1"], "d0")]),
            satellite("s2", "d0", 0, 10, vec![instrument("i2", &["m2"], "d0")]),
        ],
        slew_time,
        data: data_entries,
        have_image: Vec::new(),
        goal: GoalSpecV1 {
            pointing: vec![pointing("s2", "far")],
            have_image: goal_images,
        },
    }
}

/// The goal already holds: the image is on board and `s1` points at `d0`.
#[must_use]
pub fn already_satisfied() -> ProblemV1 {
    let mut problem = single_satellite();
    problem.have_image = vec![image("d1", "m1")];
    problem.goal.pointing = vec![pointing("s1", "d0")];
    problem
}

/// `s1` carries a powered, calibrated `i1` (mode `m1`, target `d0`) and an
/// idle `i2` (mode `m2`, target `d2`).
#[must_use]
pub fn powered_other_instrument() -> ProblemV1 {
    let mut ready = instrument("i1", &["m1"], "d0");
    ready.calibrated = true;
    let mut sat = satellite("s1", "d0", 20, 10, vec![ready, instrument("i2", &["m2"], "d2")]);
    sat.powered = Some("i1".into());
    ProblemV1 {
        directions: names(&["d0", "d1", "d2"]),
        modes: names(&["m1", "m2"]),
        satellites: vec![sat],
        slew_time: vec![slew("d0", "d1", 1), slew("d0", "d2", 1), slew("d1", "d2", 1)],
        data: vec![data("d1", "m1", 1), data("d1", "m2", 1)],
        have_image: Vec::new(),
        goal: GoalSpecV1 {
            pointing: Vec::new(),
            have_image: vec![image("d1", "m2")],
        },
    }
}

/// A deterministic fleet of `satellites` satellites and `images` goal
/// images, for scaling runs.
///
/// Image `k` is `(d{k+1}, m{1 + k % 2})`. Satellite `j` carries one
/// instrument supporting `m1`, plus `m2` when `j` is even, calibrated at
/// `d{j % directions}`. Every direction pair has a slew entry, every image a
/// data entry, and every satellite must end at its starting direction.
#[must_use]
pub fn fleet(satellites: usize, images: usize) -> ProblemV1 {
    let direction_count = images + 1;
    let directions: Vec<String> = (0..direction_count).map(|d| format!("d{d}")).collect();

    let mut slew_time = Vec::new();
    for from in 0..direction_count {
        for to in from + 1..direction_count {
            slew_time.push(SlewEntryV1 {
                from: directions[from].clone(),
                to: directions[to].clone(),
                cost: (to - from) as u64 + 1,
            });
        }
    }

    let mut fleet = Vec::with_capacity(satellites);
    let mut goal_pointing = Vec::with_capacity(satellites);
    for j in 0..satellites {
        let name = format!("s{}", j + 1);
        let start = &directions[j % direction_count];
        let supports: &[&str] = if j % 2 == 0 { &["m1", "m2"] } else { &["m1"] };
        fleet.push(satellite(
            &name,
            start,
            10_000,
            10_000,
            vec![instrument(&format!("i{}", j + 1), supports, &directions[j % direction_count])],
        ));
        goal_pointing.push(pointing(&name, start));
    }

    let mut data_entries = Vec::with_capacity(images);
    let mut goal_images = Vec::with_capacity(images);
    for k in 0..images {
        let direction = &directions[k + 1];
        let mode = if k % 2 == 0 { "m1" } else { "m2" };
        data_entries.push(data(direction, mode, 1));
        goal_images.push(image(direction, mode));
    }

    ProblemV1 {
        directions,
        modes: names(&["m1", "m2"]),
        satellites: fleet,
        slew_time,
        data: data_entries,
        have_image: Vec::new(),
        goal: GoalSpecV1 {
            pointing: goal_pointing,
            have_image: goal_images,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyplan_kernel::carrier::compile::compile;

    #[test]
    fn every_fixture_compiles() {
        for problem in [
            single_satellite(),
            fuel_starved(),
            two_satellites(),
            contested(),
            shared_target(),
            greedy_trap(),
            stranded_pointing(4),
            already_satisfied(),
            powered_other_instrument(),
            fleet(3, 5),
        ] {
            compile(&problem).unwrap();
        }
    }

    #[test]
    fn fleet_is_deterministic_and_sized() {
        let problem = fleet(4, 6);
        assert_eq!(problem, fleet(4, 6));
        assert_eq!(problem.satellites.len(), 4);
        assert_eq!(problem.goal.have_image.len(), 6);
        assert_eq!(problem.directions.len(), 7);
        // Complete upper triangle of slew entries.
        assert_eq!(problem.slew_time.len(), 7 * 6 / 2);
    }
}
