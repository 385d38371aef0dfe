//! Sweep result types
//!
//! Contains the per-level records kept while the sweep runs and the final
//! result returned once every level has been evaluated.

use jiff::Timestamp;
use serde::Serialize;

use super::grid::unflatten;
use crate::model::{Metric, ParameterVector};

/// Everything evaluated during one level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelRecord {
    /// Zero-based level index
    pub level: usize,

    /// Center of this level's grid
    pub center: Vec<f64>,

    /// Half-width per parameter before clamping to bounds
    pub half_widths: Vec<f64>,

    /// Grid values per parameter
    pub axes: Vec<Vec<f64>>,

    /// Error of every grid point, in row-major order
    pub errors: Vec<f64>,

    /// Index into `errors` of the winning point
    pub best_index: usize,

    /// Error at the winning point
    pub best_error: f64,
}

impl LevelRecord {
    /// Coordinates of the winning point
    #[must_use]
    pub fn best_point(&self) -> Vec<f64> {
        self.point(self.best_index)
    }

    /// Coordinates of the `index`-th grid point
    #[must_use]
    pub fn point(&self, index: usize) -> Vec<f64> {
        let lengths: Vec<usize> = self.axes.iter().map(Vec::len).collect();
        unflatten(index, &lengths)
            .into_iter()
            .zip(&self.axes)
            .map(|(i, axis)| axis[i])
            .collect()
    }

    /// Grid spacing per parameter (zero for degenerate axes)
    #[must_use]
    pub fn resolution(&self) -> Vec<f64> {
        self.axes
            .iter()
            .map(|axis| match (axis.first(), axis.last()) {
                (Some(first), Some(last)) if axis.len() > 1 => {
                    (last - first) / (axis.len() - 1) as f64
                }
                _ => 0.0,
            })
            .collect()
    }
}

/// Final result of a multilevel sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult {
    /// Best parameter values found
    pub parameters: ParameterVector,

    /// Error at the best point
    pub error: f64,

    /// Replicate-averaged metric at the best point
    pub metric: Metric,

    /// Center the last level recentered on
    pub final_center: ParameterVector,

    /// Error at `final_center` (NaN when the last level produced no finite error)
    pub final_error: f64,

    /// One record per completed level
    pub levels: Vec<LevelRecord>,

    /// Number of black-box evaluations performed
    pub evaluations: usize,

    pub started_at: Timestamp,
    pub finished_at: Timestamp,
}

impl SweepResult {
    /// Grid spacing of the final level
    #[must_use]
    pub fn final_resolution(&self) -> Vec<f64> {
        self.levels
            .last()
            .map(LevelRecord::resolution)
            .unwrap_or_default()
    }
}
