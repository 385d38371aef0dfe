//! Error types for configuration handling, simulator execution and calibration
//!
//! Each concern has its own enum so callers can match on the failure they
//! care about; [`Error`] aggregates them for functions that cross concerns.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// Configuration file errors
// ============================================================================

/// The configuration file could not be interpreted
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML in {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("node not found: {0}")]
    MissingNode(String),

    #[error("attribute `{attribute}` not found on {node}")]
    MissingAttribute { node: String, attribute: String },

    #[error("invalid value {text:?} at {node}")]
    InvalidValue { node: String, text: String },

    #[error("{node} holds {found} entries but {expected} were supplied")]
    LengthMismatch {
        node: String,
        expected: usize,
        found: usize,
    },

    #[error("{0} has child elements and cannot hold a value")]
    NotALeaf(String),
}

// ============================================================================
// Validation errors
// ============================================================================

/// The side of a range a rejected value fell outside of
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Inclusive lower bound
    Lower(f64),
    /// Inclusive upper bound
    Upper(f64),
    /// Exclusive lower bound
    Above(f64),
    /// Value must not be NaN or infinite
    Finite,
    /// Value must be a whole number
    Integral,
    /// Value must be exactly 0 or 1
    Boolean,
    /// Value is text and cannot be set numerically
    Text,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Lower(v) => write!(f, "lower bound {v:?}"),
            Bound::Upper(v) => write!(f, "upper bound {v:?}"),
            Bound::Above(v) => write!(f, "exclusive lower bound {v:?}"),
            Bound::Finite => write!(f, "requirement to be finite"),
            Bound::Integral => write!(f, "requirement to be an integer"),
            Bound::Boolean => write!(f, "requirement to be 0 or 1"),
            Bound::Text => write!(f, "text-only value"),
        }
    }
}

/// A field assignment fell outside its allowed range
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} = {value} violates {bound}")]
pub struct ValidationError {
    pub field: String,
    pub value: f64,
    pub bound: Bound,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, value: f64, bound: Bound) -> Self {
        Self {
            field: field.into(),
            value,
            bound,
        }
    }
}

// ============================================================================
// Execution errors
// ============================================================================

/// The simulator could not be launched or reported failure
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to launch {}", executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("replicate {replicate} exited with status {code}")]
    Failed { replicate: usize, code: i32 },

    #[error("replicate {replicate} was terminated by a signal")]
    Terminated { replicate: usize },

    #[error("at least one replicate is required")]
    NoReplicates,

    #[error("outputs are kept but no archive directory was configured")]
    NoArchiveRoot,
}

// ============================================================================
// Parameter addressing errors
// ============================================================================

/// A parameter name could not be mapped onto the parameter store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("malformed parameter path `{0}`")]
    Malformed(String),

    #[error("unsupported cell field `{0}`")]
    UnknownCellField(String),

    #[error("unsupported substance field `{0}`")]
    UnknownSubstanceField(String),

    #[error("substance `{0}` is not defined")]
    UnknownSubstance(String),

    #[error("user parameter `{0}` is not defined")]
    UnknownUserParameter(String),

    #[error("cycle phase {index} does not exist ({count} phases defined)")]
    PhaseOutOfRange { index: usize, count: usize },
}

// ============================================================================
// Output errors
// ============================================================================

/// Simulator output artifacts were missing or malformed
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no output for timestep {timestep} in {}", dir.display())]
    MissingTimestep { timestep: usize, dir: PathBuf },

    #[error("unknown cell variable `{0}`")]
    UnknownVariable(String),

    #[error("unknown substance `{0}` in microenvironment output")]
    UnknownSubstance(String),

    #[error("malformed MAT file {}: {reason}", path.display())]
    MalformedMat { path: PathBuf, reason: String },

    #[error("matrix `{name}` not found in {}", path.display())]
    MissingMatrix { path: PathBuf, name: String },

    #[error("malformed output index {}: {reason}", path.display())]
    MalformedIndex { path: PathBuf, reason: String },
}

// ============================================================================
// Sweep errors
// ============================================================================

/// The calibration could not be configured or scored
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    #[error("invalid sweep configuration: {0}")]
    InvalidSweep(String),

    #[error("metric has {found} values but the target has {expected}")]
    MetricShape { expected: usize, found: usize },

    #[error("black box returned no metric for {0}")]
    NoMetric(String),
}

// ============================================================================
// Aggregate error
// ============================================================================

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not loaded in the parameter store")]
    SectionNotLoaded(String),
}

impl Error {
    /// Builds a closure that wraps an `io::Error` with the path it concerns
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_violated_bound() {
        let err = ValidationError::new("migration_bias", 1.0000001, Bound::Upper(1.0));
        let message = err.to_string();
        assert!(message.contains("migration_bias"));
        assert!(message.contains("upper bound 1.0"));
    }

    #[test]
    fn aggregate_error_is_transparent() {
        let err: Error = ResolutionError::UnknownSubstance("oxygen".into()).into();
        assert_eq!(err.to_string(), "substance `oxygen` is not defined");
    }
}
