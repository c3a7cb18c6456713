//! Planning domains driven by the runner.

pub mod satellite;
