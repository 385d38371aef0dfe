//! Values exchanged between the sweep and the black box

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Ordered `(name, value)` pairs handed to the black box
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterVector {
    entries: Vec<(String, f64)>,
}

impl ParameterVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.entries.push((name.into(), value));
    }

    /// Builder form of [`push`](Self::push)
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ParameterVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

impl fmt::Display for ParameterVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Result of post-processing one simulator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Metric {
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Metric::Scalar(v) => std::slice::from_ref(v),
            Metric::Vector(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Element-wise mean of replicate metrics.
    ///
    /// Returns `Ok(None)` for an empty slice; every metric must have the
    /// length of the first. A single scalar input stays a scalar.
    pub fn mean(metrics: &[Metric]) -> Result<Option<Metric>, SweepError> {
        let Some(first) = metrics.first() else {
            return Ok(None);
        };
        let len = first.len();
        let mut sums = vec![0.0; len];
        for metric in metrics {
            if metric.len() != len {
                return Err(SweepError::MetricShape {
                    expected: len,
                    found: metric.len(),
                });
            }
            for (sum, value) in sums.iter_mut().zip(metric.as_slice()) {
                *sum += value;
            }
        }
        let count = metrics.len() as f64;
        let means: Vec<f64> = sums.into_iter().map(|s| s / count).collect();
        Ok(Some(match first {
            Metric::Scalar(_) => Metric::Scalar(means[0]),
            Metric::Vector(_) => Metric::Vector(means),
        }))
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Metric::Scalar(value)
    }
}

impl From<Vec<f64>> for Metric {
    fn from(values: Vec<f64>) -> Self {
        Metric::Vector(values)
    }
}
