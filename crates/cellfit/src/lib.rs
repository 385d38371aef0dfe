//! Command-line front end for cellfit
//!
//! Wraps `cellfit_core` with:
//! - YAML calibration plans describing a simulator project and a sweep
//! - `show`/`set`/`run`/`calibrate` command implementations
//! - Logging initialisation for the binary

pub mod commands;
pub mod logging;
pub mod plan;

pub use logging::init_logging;
pub use plan::{CalibrationPlan, ProcessorPlan, SimulatorPlan};
