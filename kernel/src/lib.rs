//! Skyplan kernel: the deterministic core of the satellite-imaging planner.
//!
//! # API Surface
//!
//! - [`carrier::compile::compile`] -- compile a `ProblemV1` into a `WorldState` and `Goal`
//! - [`operators::apply::apply`] -- apply a primitive action to a `WorldState`
//! - [`cost::feasibility::analyze`] -- cost and filter every pending acquisition
//! - [`proof::replay::replay_verify`] -- verify a plan by deterministic replay
//!
//! # Module Dependency Direction
//!
//! `carrier` ← `operators` ← `cost`, `proof`
//!
//! `error` holds the structural error shared by every layer.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod carrier;
pub mod cost;
pub mod error;
pub mod operators;
pub mod proof;
