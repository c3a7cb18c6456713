//! Cost module: fuel estimates and per-refinement feasibility analysis.
//!
//! Depends on `carrier`. Read-only: nothing here mutates a `WorldState`.

pub mod feasibility;
pub mod model;
