//! Operators module: the primitive action set and the `apply()` entry point.
//!
//! Depends on `carrier`, and on `proof::canon` for registry digests. Does not
//! import from `cost`.

pub mod action;
pub mod apply;
pub mod operator_registry;
