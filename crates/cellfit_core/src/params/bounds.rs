//! Range constraints enforced by parameter setters

use crate::error::{Bound, ValidationError};

/// Declared range of a numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Any finite value
    Finite,
    /// `value >= 0`
    NonNegative,
    /// `value > 0`
    Positive,
    /// `0 <= value <= 1`
    UnitInterval,
}

impl Constraint {
    /// Returns `value` unchanged if it satisfies the constraint.
    ///
    /// NaN and infinities are rejected by every constraint.
    pub fn check(self, field: &str, value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::new(field, value, Bound::Finite));
        }
        let violated = match self {
            Constraint::Finite => None,
            Constraint::NonNegative => (value < 0.0).then_some(Bound::Lower(0.0)),
            Constraint::Positive => (value <= 0.0).then_some(Bound::Above(0.0)),
            Constraint::UnitInterval => {
                if value < 0.0 {
                    Some(Bound::Lower(0.0))
                } else if value > 1.0 {
                    Some(Bound::Upper(1.0))
                } else {
                    None
                }
            }
        };
        match violated {
            Some(bound) => Err(ValidationError::new(field, value, bound)),
            None => Ok(value),
        }
    }
}

/// Generates a getter and a validating setter for each listed `f64` field.
///
/// ```ignore
/// bounded_fields!(Motility {
///     speed / set_speed: Constraint::NonNegative,
/// });
/// ```
macro_rules! bounded_fields {
    ($ty:ty { $($field:ident / $setter:ident : $constraint:expr),* $(,)? }) => {
        impl $ty {
            $(
                pub fn $field(&self) -> f64 {
                    self.$field
                }

                pub fn $setter(&mut self, value: f64) -> Result<(), $crate::error::ValidationError> {
                    self.$field = $constraint.check(stringify!($field), value)?;
                    Ok(())
                }
            )*
        }
    };
}

pub(crate) use bounded_fields;
