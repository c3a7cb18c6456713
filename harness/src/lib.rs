//! Skyplan harness: the satellite-imaging domain and its runner.
//!
//! The harness plugs the kernel's state and actions into the generic
//! search engine (`worlds::satellite`), and drives a goal through
//! search and replay verification (`runner`).
//!
//! The harness does not evaluate preconditions or compute costs; it
//! delegates both to the kernel. Methods decide *what* to try, the kernel
//! decides whether it is allowed.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod runner;
pub mod worlds;

pub use config::{ChoicePolicy, ConfigError, PlannerConfig};
pub use runner::{achieve, run_problem, PlanReportV1, RunError};
