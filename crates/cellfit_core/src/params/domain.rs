//! Simulation domain and overall timing sections

use serde::{Deserialize, Serialize};

use super::bounds::{Constraint, bounded_fields};
use crate::error::{Bound, ValidationError};

/// Spatial axis of the simulation domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Closed interval `[min, max]` along one axis, with `min < max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    min: f64,
    max: f64,
}

impl AxisRange {
    pub fn new(axis: Axis, min: f64, max: f64) -> Result<Self, ValidationError> {
        let min = Constraint::Finite.check(&format!("{}_min", axis.as_str()), min)?;
        let max = Constraint::Finite.check(&format!("{}_max", axis.as_str()), max)?;
        if min >= max {
            return Err(ValidationError::new(
                format!("{}_max", axis.as_str()),
                max,
                Bound::Above(min),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Bounding box and mesh of the simulated region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Domain {
    x: AxisRange,
    y: AxisRange,
    z: AxisRange,
    dx: f64,
    dy: f64,
    dz: f64,
    pub use_2d: bool,
}

bounded_fields!(Domain {
    dx / set_dx: Constraint::Positive,
    dy / set_dy: Constraint::Positive,
    dz / set_dz: Constraint::Positive,
});

impl Domain {
    pub fn new(
        x: AxisRange,
        y: AxisRange,
        z: AxisRange,
        spacing: [f64; 3],
        use_2d: bool,
    ) -> Result<Self, ValidationError> {
        let mut domain = Self {
            x,
            y,
            z,
            dx: 1.0,
            dy: 1.0,
            dz: 1.0,
            use_2d,
        };
        domain.set_dx(spacing[0])?;
        domain.set_dy(spacing[1])?;
        domain.set_dz(spacing[2])?;
        Ok(domain)
    }

    pub fn range(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set_range(&mut self, axis: Axis, range: AxisRange) {
        match axis {
            Axis::X => self.x = range,
            Axis::Y => self.y = range,
            Axis::Z => self.z = range,
        }
    }
}

/// Simulated time span and solver step sizes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overall {
    max_time: f64,
    dt_diffusion: f64,
    dt_mechanics: f64,
    dt_phenotype: f64,
}

bounded_fields!(Overall {
    max_time / set_max_time: Constraint::NonNegative,
    dt_diffusion / set_dt_diffusion: Constraint::NonNegative,
    dt_mechanics / set_dt_mechanics: Constraint::NonNegative,
    dt_phenotype / set_dt_phenotype: Constraint::NonNegative,
});

impl Default for Overall {
    fn default() -> Self {
        Self {
            max_time: 7200.0,
            dt_diffusion: 0.01,
            dt_mechanics: 0.1,
            dt_phenotype: 6.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_range_requires_min_below_max() {
        assert!(AxisRange::new(Axis::X, -500.0, 500.0).is_ok());
        let err = AxisRange::new(Axis::Y, 10.0, 10.0).unwrap_err();
        assert_eq!(err.field, "y_max");
        assert_eq!(err.bound, Bound::Above(10.0));
    }

    #[test]
    fn spacing_must_be_positive() {
        let x = AxisRange::new(Axis::X, 0.0, 1.0).unwrap();
        let err = Domain::new(x, x, x, [20.0, 0.0, 20.0], true).unwrap_err();
        assert_eq!(err.field, "dy");
    }

    #[test]
    fn overall_rejects_negative_step() {
        let mut overall = Overall::default();
        assert!(overall.set_dt_mechanics(-0.1).is_err());
        assert_eq!(overall.dt_mechanics(), 0.1);
    }
}
