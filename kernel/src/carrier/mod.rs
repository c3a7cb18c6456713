//! Carrier module: identifiers, `WorldState`, `Goal`, and the compilation boundary.
//!
//! This is the foundational layer. Only [`crate::error`] is imported here.

pub mod compile;
pub mod goal;
pub mod ids;
pub mod world_state;
