//! One-dimensional parameter scan

use tracing::debug;

use crate::error::{Result, SweepError};
use crate::model::{Metric, ParameterVector};
use crate::runner::BlackBox;

/// Evaluates `name` at `start, start + step, ...` for every value below `stop`.
///
/// Returns each value with the metrics the black box produced for it.
pub fn linear_sweep<B: BlackBox + ?Sized>(
    black_box: &mut B,
    name: &str,
    start: f64,
    stop: f64,
    step: f64,
) -> Result<Vec<(f64, Vec<Metric>)>> {
    if !(step > 0.0 && step.is_finite()) {
        return Err(SweepError::InvalidSweep(format!("step must be positive, got {step}")).into());
    }
    if !(start.is_finite() && stop.is_finite()) {
        return Err(SweepError::InvalidSweep("sweep range must be finite".into()).into());
    }

    let mut results = Vec::new();
    let mut i = 0usize;
    loop {
        let value = start + step * i as f64;
        if value >= stop {
            break;
        }
        let params = ParameterVector::new().with(name, value);
        let metrics = black_box.evaluate(&params)?;
        debug!(%params, replicates = metrics.len(), "evaluated linear sweep point");
        results.push((value, metrics));
        i += 1;
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_before_upper_end() {
        let mut square = |p: &ParameterVector| -> Result<Vec<Metric>> {
            let x = p.get("x").unwrap_or_default();
            Ok(vec![Metric::Scalar(x * x)])
        };
        let results = linear_sweep(&mut square, "x", 0.0, 1.0, 0.25).unwrap();
        let values: Vec<f64> = results.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(results[3].1, vec![Metric::Scalar(0.5625)]);
    }

    #[test]
    fn rejects_non_positive_step() {
        let mut never = |_: &ParameterVector| -> Result<Vec<Metric>> { Ok(Vec::new()) };
        assert!(linear_sweep(&mut never, "x", 0.0, 1.0, 0.0).is_err());
    }
}
