//! Sweep configuration types

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// A parameter explored by the sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParameter {
    /// Parameter path handed to the black box (e.g. `cell/speed`)
    pub name: String,
    /// Center of the first level
    pub initial: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    /// Half-width of the first level's interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_width: Option<f64>,
}

impl SweepParameter {
    pub fn new(name: impl Into<String>, initial: f64) -> Self {
        Self {
            name: name.into(),
            initial,
            lower: None,
            upper: None,
            half_width: None,
        }
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    pub fn with_bounds(self, lower: f64, upper: f64) -> Self {
        self.with_lower(lower).with_upper(upper)
    }

    pub fn with_half_width(mut self, half_width: f64) -> Self {
        self.half_width = Some(half_width);
        self
    }

    /// Absolute bounds, unbounded sides as infinities
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.lower.unwrap_or(f64::NEG_INFINITY),
            self.upper.unwrap_or(f64::INFINITY),
        )
    }

    /// First-level half-width: explicit, else `relative × |initial|`, else 1
    pub fn initial_half_width(&self, relative: f64) -> f64 {
        self.half_width.unwrap_or_else(|| {
            if self.initial == 0.0 {
                1.0
            } else {
                relative * self.initial.abs()
            }
        })
    }
}

/// Distance between a model metric and the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMetric {
    /// Sum of squared residuals
    #[default]
    SumSquared,
    /// Mean of squared residuals
    MeanSquared,
}

impl ErrorMetric {
    pub fn distance(self, model: &[f64], target: &[f64]) -> Result<f64, SweepError> {
        if model.len() != target.len() {
            return Err(SweepError::MetricShape {
                expected: target.len(),
                found: model.len(),
            });
        }
        let sum: f64 = model
            .iter()
            .zip(target)
            .map(|(m, t)| (m - t) * (m - t))
            .sum();
        Ok(match self {
            ErrorMetric::SumSquared => sum,
            ErrorMetric::MeanSquared if target.is_empty() => 0.0,
            ErrorMetric::MeanSquared => sum / target.len() as f64,
        })
    }
}

/// Multilevel sweep settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub parameters: Vec<SweepParameter>,
    #[serde(default = "default_levels")]
    pub levels: usize,
    #[serde(default = "default_points_per_direction")]
    pub points_per_direction: usize,
    #[serde(default = "default_shrink_factor")]
    pub shrink_factor: f64,
    /// Default half-width as a multiple of `|initial|`
    #[serde(default = "default_relative_half_width")]
    pub relative_half_width: f64,
    #[serde(default)]
    pub error_metric: ErrorMetric,
}

fn default_levels() -> usize {
    3
}

fn default_points_per_direction() -> usize {
    5
}

fn default_shrink_factor() -> f64 {
    0.5
}

fn default_relative_half_width() -> f64 {
    1.0
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            parameters: Vec::new(),
            levels: default_levels(),
            points_per_direction: default_points_per_direction(),
            shrink_factor: default_shrink_factor(),
            relative_half_width: default_relative_half_width(),
            error_metric: ErrorMetric::default(),
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), SweepError> {
        let invalid = |reason: String| Err(SweepError::InvalidSweep(reason));

        if self.parameters.is_empty() {
            return invalid("no parameters to sweep".into());
        }
        if self.levels == 0 {
            return invalid("at least one level is required".into());
        }
        if self.points_per_direction == 0 || self.points_per_direction % 2 == 0 {
            return invalid(format!(
                "points per direction must be odd, got {}",
                self.points_per_direction
            ));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return invalid(format!(
                "shrink factor must lie in (0, 1), got {}",
                self.shrink_factor
            ));
        }
        if !(self.relative_half_width.is_finite() && self.relative_half_width > 0.0) {
            return invalid(format!(
                "relative half-width must be positive, got {}",
                self.relative_half_width
            ));
        }

        if self.points_per_level().is_none() {
            return invalid(format!(
                "{} points per direction over {} parameters is too many grid points",
                self.points_per_direction,
                self.parameters.len()
            ));
        }

        for (i, p) in self.parameters.iter().enumerate() {
            if self.parameters[..i].iter().any(|q| q.name == p.name) {
                return invalid(format!("parameter `{}` listed twice", p.name));
            }
            let (lower, upper) = p.bounds();
            if lower.is_nan() || upper.is_nan() || lower >= upper {
                return invalid(format!(
                    "`{}`: lower bound {lower} must be below upper bound {upper}",
                    p.name
                ));
            }
            if !p.initial.is_finite() || p.initial < lower || p.initial > upper {
                return invalid(format!(
                    "`{}`: initial value {} outside [{lower}, {upper}]",
                    p.name, p.initial
                ));
            }
            let half_width = p.initial_half_width(self.relative_half_width);
            if !(half_width.is_finite() && half_width >= 0.0) {
                return invalid(format!(
                    "`{}`: half-width must be finite and non-negative, got {half_width}",
                    p.name
                ));
            }
        }
        Ok(())
    }

    /// Grid points evaluated per level, `None` when the count overflows
    pub fn points_per_level(&self) -> Option<usize> {
        let dims = u32::try_from(self.parameters.len()).ok()?;
        self.points_per_direction.checked_pow(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SweepConfig {
        SweepConfig {
            parameters: vec![
                SweepParameter::new("x", 2.0).with_lower(0.0),
                SweepParameter::new("y", 0.6).with_bounds(0.0, 1.0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn default_half_width_is_relative() {
        let p = SweepParameter::new("x", -4.0);
        assert_eq!(p.initial_half_width(0.5), 2.0);
        assert_eq!(SweepParameter::new("z", 0.0).initial_half_width(0.5), 1.0);
        assert_eq!(p.with_half_width(0.1).initial_half_width(0.5), 0.1);
    }

    #[test]
    fn error_metrics() {
        let model = [1.0, 2.0];
        let target = [0.0, 4.0];
        assert_eq!(ErrorMetric::SumSquared.distance(&model, &target), Ok(5.0));
        assert_eq!(ErrorMetric::MeanSquared.distance(&model, &target), Ok(2.5));
        assert_eq!(
            ErrorMetric::SumSquared.distance(&model, &[0.0]),
            Err(SweepError::MetricShape {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn validation_catches_bad_settings() {
        assert!(valid().validate().is_ok());
        assert_eq!(valid().points_per_level(), Some(25));

        let mut config = valid();
        config.points_per_direction = 4;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.shrink_factor = 1.0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.levels = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.parameters[1].initial = 1.5;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.parameters[0].upper = Some(0.0);
        assert!(config.validate().is_err());

        assert!(SweepConfig::default().validate().is_err());
    }

    #[test]
    fn grid_too_large_to_count_is_rejected() {
        let config = SweepConfig {
            parameters: (0..30)
                .map(|i| SweepParameter::new(format!("p{i}"), 1.0))
                .collect(),
            points_per_direction: 9,
            ..Default::default()
        };
        assert_eq!(config.points_per_level(), None);
        assert!(matches!(
            config.validate(),
            Err(SweepError::InvalidSweep(reason)) if reason.contains("too many grid points")
        ));
    }
}
