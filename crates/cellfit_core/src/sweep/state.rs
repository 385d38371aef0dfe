//! Level-by-level sweep execution

use jiff::Timestamp;
use serde::Serialize;
use tracing::{debug, info};

use super::config::SweepConfig;
use super::grid::{axis_points, grid_points};
use super::result::{LevelRecord, SweepResult};
use crate::error::{Result, SweepError};
use crate::model::{Metric, ParameterVector};
use crate::runner::BlackBox;

/// True when `candidate` should replace `incumbent` as the best error.
///
/// Comparison is strict so the earliest point wins ties, and NaN never wins.
fn improves(candidate: f64, incumbent: f64) -> bool {
    !candidate.is_nan() && (incumbent.is_nan() || candidate < incumbent)
}

/// Search window of the current level and the errors evaluated in it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepState {
    level: usize,
    center: Vec<f64>,
    half_widths: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    axes: Vec<Vec<f64>>,
    errors: Vec<f64>,
}

impl SweepState {
    pub fn new(config: &SweepConfig) -> Result<Self, SweepError> {
        config.validate()?;
        let params = &config.parameters;
        Ok(Self {
            level: 0,
            center: params.iter().map(|p| p.initial).collect(),
            half_widths: params
                .iter()
                .map(|p| p.initial_half_width(config.relative_half_width))
                .collect(),
            lower: params.iter().map(|p| p.bounds().0).collect(),
            upper: params.iter().map(|p| p.bounds().1).collect(),
            axes: Vec::new(),
            errors: Vec::new(),
        })
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn center(&self) -> &[f64] {
        &self.center
    }

    pub fn half_widths(&self) -> &[f64] {
        &self.half_widths
    }

    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// Regenerates the axes around the current center and returns the grid
    pub fn build_grid(&mut self, points_per_direction: usize) -> Vec<Vec<f64>> {
        self.axes = (0..self.center.len())
            .map(|i| {
                axis_points(
                    self.center[i],
                    self.half_widths[i],
                    self.lower[i],
                    self.upper[i],
                    points_per_direction,
                )
            })
            .collect();
        self.errors.clear();
        grid_points(&self.axes)
    }

    pub fn record(&mut self, error: f64) {
        self.errors.push(error);
    }

    /// Index and error of the best point evaluated so far in this level
    pub fn best(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &error) in self.errors.iter().enumerate() {
            match best {
                Some((_, incumbent)) if !improves(error, incumbent) => {}
                _ if error.is_nan() => {}
                _ => best = Some((i, error)),
            }
        }
        best
    }

    /// Moves to the next level: recenters and shrinks every half-width
    pub fn advance(&mut self, center: Vec<f64>, shrink_factor: f64) {
        self.center = center;
        for w in &mut self.half_widths {
            *w *= shrink_factor;
        }
        self.level += 1;
    }
}

struct Best {
    point: Vec<f64>,
    error: f64,
    metric: Metric,
}

/// Iteratively refined grid search driving a [`BlackBox`]
///
/// Each level evaluates `P^n` points around the current center, recenters
/// on the point with the lowest error and shrinks the window by the shrink
/// factor. Evaluation is sequential in row-major order.
pub struct MultiLevelSweep<'a, B: BlackBox + ?Sized> {
    black_box: &'a mut B,
    target: Metric,
    config: SweepConfig,
    state: SweepState,
    records: Vec<LevelRecord>,
    evaluations: usize,
    best: Option<Best>,
    started_at: Timestamp,
}

impl<'a, B: BlackBox + ?Sized> MultiLevelSweep<'a, B> {
    pub fn new(black_box: &'a mut B, target: Metric, config: SweepConfig) -> Result<Self, SweepError> {
        let state = SweepState::new(&config)?;
        Ok(Self {
            black_box,
            target,
            config,
            state,
            records: Vec::new(),
            evaluations: 0,
            best: None,
            started_at: Timestamp::now(),
        })
    }

    pub fn state(&self) -> &SweepState {
        &self.state
    }

    pub fn records(&self) -> &[LevelRecord] {
        &self.records
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn is_finished(&self) -> bool {
        self.records.len() >= self.config.levels
    }

    fn evaluate(&mut self, point: &[f64]) -> Result<(f64, Metric)> {
        let params: ParameterVector = self
            .config
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .zip(point.iter().copied())
            .collect();

        let metrics = self.black_box.evaluate(&params)?;
        self.evaluations += 1;
        let metric = Metric::mean(&metrics)?.ok_or_else(|| SweepError::NoMetric(params.to_string()))?;
        let error = self
            .config
            .error_metric
            .distance(metric.as_slice(), self.target.as_slice())?;
        debug!(level = self.state.level(), %params, error, "evaluated grid point");
        Ok((error, metric))
    }

    /// Evaluates the current level's grid and moves to the next level
    pub fn run_level(&mut self) -> Result<&LevelRecord> {
        if self.is_finished() {
            return Err(SweepError::InvalidSweep("every level has already run".into()).into());
        }

        let level = self.state.level();
        let points = self.state.build_grid(self.config.points_per_direction);
        info!(level, points = points.len(), center = ?self.state.center(), "starting sweep level");

        for point in points {
            let (error, metric) = self.evaluate(&point)?;
            self.state.record(error);
            let replace = match &self.best {
                None => true,
                Some(best) => improves(error, best.error),
            };
            if replace {
                self.best = Some(Best {
                    point,
                    error,
                    metric,
                });
            }
        }

        let (best_index, best_error) = self.state.best().unwrap_or((0, f64::NAN));
        let record = LevelRecord {
            level,
            center: self.state.center().to_vec(),
            half_widths: self.state.half_widths().to_vec(),
            axes: self.state.axes().to_vec(),
            errors: self.state.errors().to_vec(),
            best_index,
            best_error,
        };
        let next_center = if best_error.is_nan() {
            record.center.clone()
        } else {
            record.best_point()
        };
        info!(level, best_error, center = ?next_center, "finished sweep level");

        self.state.advance(next_center, self.config.shrink_factor);
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Runs every remaining level and returns the best point found
    pub fn run(mut self) -> Result<SweepResult> {
        while !self.is_finished() {
            self.run_level()?;
        }
        let best = self
            .best
            .ok_or_else(|| SweepError::NoMetric("any grid point".into()))?;
        let names: Vec<&str> = self.config.parameters.iter().map(|p| p.name.as_str()).collect();
        let parameters = names.iter().copied().zip(best.point).collect();
        let final_center = names
            .iter()
            .copied()
            .zip(self.state.center().iter().copied())
            .collect();
        let final_error = self.records.last().map_or(f64::NAN, |r| r.best_error);
        info!(error = best.error, final_error, evaluations = self.evaluations, "sweep complete");
        Ok(SweepResult {
            parameters,
            error: best.error,
            metric: best.metric,
            final_center,
            final_error,
            levels: self.records,
            evaluations: self.evaluations,
            started_at: self.started_at,
            finished_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::config::SweepParameter;

    #[test]
    fn nan_never_wins_and_ties_keep_first() {
        assert!(!improves(f64::NAN, 1.0));
        assert!(improves(1.0, f64::NAN));
        assert!(!improves(1.0, 1.0));

        let mut state = SweepState::new(&SweepConfig {
            parameters: vec![SweepParameter::new("x", 1.0)],
            ..Default::default()
        })
        .unwrap();
        for e in [f64::NAN, 2.0, 1.0, 1.0, f64::NAN] {
            state.record(e);
        }
        assert_eq!(state.best(), Some((2, 1.0)));
    }

    #[test]
    fn advance_shrinks_half_widths() {
        let config = SweepConfig {
            parameters: vec![SweepParameter::new("x", 4.0)],
            ..Default::default()
        };
        let mut state = SweepState::new(&config).unwrap();
        assert_eq!(state.half_widths(), &[4.0]);
        state.advance(vec![3.0], 0.5);
        assert_eq!(state.half_widths(), &[2.0]);
        assert_eq!(state.center(), &[3.0]);
        assert_eq!(state.level(), 1);
    }
}
