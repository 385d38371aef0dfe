//! Black-box calibration library for agent-based cell simulators
//!
//! This crate wraps an external simulator executable so that it can be
//! treated as a function from parameters to metrics, and searches the
//! parameter space for values that reproduce a target metric.
//! It provides:
//! - A typed, validated `ParameterStore` for the simulator's XML settings
//! - A `ConfigCodec` that reads and writes those settings without touching
//!   unrelated parts of the file
//! - A parameter addressing language (`cell/speed`, `me:oxygen/decay_rate`,
//!   `random_seed`) used to map flat parameter vectors onto the store
//! - A `BlackBoxRunner` that updates, executes and post-processes the simulator
//! - Readers for the simulator's output snapshots
//! - A `MultiLevelSweep` grid-refinement optimizer
//!
//! # Example
//!
//! ```ignore
//! use cellfit_core::codec::ConfigCodec;
//! use cellfit_core::output::CellCount;
//! use cellfit_core::runner::{BlackBoxRunner, PathUpdater};
//! use cellfit_core::sweep::{MultiLevelSweep, SweepConfig, SweepParameter};
//! use cellfit_core::Metric;
//!
//! let codec = ConfigCodec::new("project/config/PhysiCell_settings.xml");
//! let mut runner = BlackBoxRunner::new("project", "project", "output")
//!     .with_updater(PathUpdater::new(codec, "default"))
//!     .with_processor(CellCount);
//!
//! let config = SweepConfig {
//!     parameters: vec![
//!         SweepParameter::new("cell/speed", 1.0).with_lower(0.0),
//!         SweepParameter::new("cell/migration_bias", 0.5).with_bounds(0.0, 1.0),
//!     ],
//!     ..Default::default()
//! };
//!
//! let target = Metric::Vector(vec![5.0, 9.0, 17.0]);
//! let result = MultiLevelSweep::new(&mut runner, target, config)?.run()?;
//! println!("best fit: {} (error {})", result.parameters, result.error);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod address;
pub mod codec;
pub mod error;
pub mod output;
pub mod runner;
pub mod sweep;
pub mod util;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;
pub mod params;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use address::ParameterPath;
pub use codec::ConfigCodec;
pub use error::{Error, Result};
pub use model::{Metric, ParameterVector};
pub use params::{ParameterStore, Selector};
pub use runner::{BlackBox, BlackBoxRunner};
pub use sweep::{MultiLevelSweep, SweepConfig, SweepResult};
