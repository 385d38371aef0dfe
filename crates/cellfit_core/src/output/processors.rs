//! Built-in metric extractors

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cells::{cell_counts_over_time, final_positions};
use crate::error::Result;
use crate::model::Metric;
use crate::params::Axis;
use crate::runner::Processor;

/// Number of cells at every timestep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCount;

impl Processor for CellCount {
    fn process(&mut self, output_dir: &Path) -> Result<Metric> {
        Ok(Metric::Vector(cell_counts_over_time(output_dir)?))
    }
}

/// Coordinate of every cell along one axis at the last timestep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPositions {
    pub axis: Axis,
}

impl Processor for FinalPositions {
    fn process(&mut self, output_dir: &Path) -> Result<Metric> {
        Ok(Metric::Vector(final_positions(output_dir, self.axis)?))
    }
}
