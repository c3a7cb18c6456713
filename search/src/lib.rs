//! Skyplan search: a generic task-network refinement engine.
//!
//! This crate depends only on `skyplan_kernel` (for canonical hashing). It
//! knows nothing about satellites: domains plug in through
//! [`contract::PlanningDomainV1`] and a [`method::MethodRegistryV1`].
//!
//! # Crate dependency graph
//!
//! ```text
//! skyplan_kernel  ←  skyplan_search  ←  skyplan_harness
//! (state, actions)   (engine, trace)    (satellite methods, runner)
//! ```
//!
//! # Key types
//!
//! - [`PlanningDomainV1`] — state, action and task types of a domain
//! - [`MethodRegistryV1`] — task name → ordered alternative methods
//! - [`SearchPolicyV1`] — depth and method-attempt budgets
//! - [`RefinementTraceV1`] — ordered audit log of a search
//! - [`plan`] — the choice-point engine

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod engine;
pub mod error;
pub mod method;
pub mod policy;
#[cfg(test)]
mod testing;
pub mod trace;

pub use contract::{ApplyOutcomeV1, PlanningDomainV1, TaskV1};
pub use engine::{plan, SearchOutcomeV1, SearchResultV1, SearchStatsV1};
pub use error::SearchError;
pub use method::{MethodRegistryV1, Refinement};
pub use policy::SearchPolicyV1;
pub use trace::{RefinementTraceV1, TraceEventV1};
