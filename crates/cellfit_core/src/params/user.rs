//! Free-form user parameters and cell custom data

use std::fmt;

use serde::Serialize;

use crate::error::{Bound, ValidationError};

/// Scalar value of a user parameter, tagged by its declared type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UserValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    Text(String),
}

impl UserValue {
    /// Value of the `type` attribute this variant is stored under
    pub fn type_name(&self) -> &'static str {
        match self {
            UserValue::Int(_) => "int",
            UserValue::Double(_) => "double",
            UserValue::Bool(_) => "bool",
            UserValue::Text(_) => "string",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            UserValue::Int(v) => Some(*v as f64),
            UserValue::Double(v) => Some(*v),
            UserValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            UserValue::Text(_) => None,
        }
    }
}

impl fmt::Display for UserValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserValue::Int(v) => write!(f, "{v}"),
            UserValue::Double(v) => write!(f, "{v}"),
            UserValue::Bool(v) => write!(f, "{v}"),
            UserValue::Text(v) => f.write_str(v),
        }
    }
}

/// Named scalar from `user_parameters` or a cell type's `custom_data`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserParameter {
    pub name: String,
    value: UserValue,
}

impl UserParameter {
    pub fn new(name: impl Into<String>, value: UserValue) -> Result<Self, ValidationError> {
        let name = name.into();
        check_value(&name, &value)?;
        Ok(Self { name, value })
    }

    pub fn value(&self) -> &UserValue {
        &self.value
    }

    /// Replaces the value, possibly changing its type
    pub fn set_value(&mut self, value: UserValue) -> Result<(), ValidationError> {
        check_value(&self.name, &value)?;
        self.value = value;
        Ok(())
    }

    /// Assigns a number while keeping the declared type.
    ///
    /// Integers reject fractional values, booleans accept only 0 and 1,
    /// and text parameters reject every number.
    pub fn assign_number(&mut self, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::new(&self.name, value, Bound::Finite));
        }
        self.value = match self.value {
            UserValue::Int(_) => {
                if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
                    return Err(ValidationError::new(&self.name, value, Bound::Integral));
                }
                UserValue::Int(value as i64)
            }
            UserValue::Double(_) => UserValue::Double(value),
            UserValue::Bool(_) => {
                if value == 0.0 {
                    UserValue::Bool(false)
                } else if value == 1.0 {
                    UserValue::Bool(true)
                } else {
                    return Err(ValidationError::new(&self.name, value, Bound::Boolean));
                }
            }
            UserValue::Text(_) => {
                return Err(ValidationError::new(&self.name, value, Bound::Text));
            }
        };
        Ok(())
    }
}

fn check_value(name: &str, value: &UserValue) -> Result<(), ValidationError> {
    match value {
        UserValue::Double(v) if !v.is_finite() => {
            Err(ValidationError::new(name, *v, Bound::Finite))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_rejects_fraction() {
        let mut seed = UserParameter::new("random_seed", UserValue::Int(0)).unwrap();
        seed.assign_number(42.0).unwrap();
        assert_eq!(seed.value(), &UserValue::Int(42));

        let err = seed.assign_number(2.5).unwrap_err();
        assert_eq!(err.bound, Bound::Integral);
        assert_eq!(seed.value(), &UserValue::Int(42));
    }

    #[test]
    fn bool_accepts_zero_and_one() {
        let mut flag = UserParameter::new("track", UserValue::Bool(true)).unwrap();
        flag.assign_number(0.0).unwrap();
        assert_eq!(flag.value(), &UserValue::Bool(false));
        assert!(flag.assign_number(0.5).is_err());
    }

    #[test]
    fn text_cannot_take_numbers() {
        let mut label = UserParameter::new("label", UserValue::Text("a".into())).unwrap();
        let err = label.assign_number(1.0).unwrap_err();
        assert_eq!(err.bound, Bound::Text);
    }

    #[test]
    fn double_rejects_nan() {
        assert!(UserParameter::new("drift", UserValue::Double(f64::NAN)).is_err());
    }
}
