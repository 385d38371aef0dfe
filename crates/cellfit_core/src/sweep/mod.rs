//! Calibration by iteratively refined grid search
//!
//! [`MultiLevelSweep`] evaluates a Cartesian grid around the current center,
//! recenters on the best point and shrinks the window, for a fixed number
//! of levels. It depends only on the [`BlackBox`](crate::runner::BlackBox)
//! capability, so closures work as well as a real simulator runner.

pub mod config;
pub mod grid;
pub mod linear;
pub mod result;
pub mod state;

pub use config::{ErrorMetric, SweepConfig, SweepParameter};
pub use linear::linear_sweep;
pub use result::{LevelRecord, SweepResult};
pub use state::{MultiLevelSweep, SweepState};
