use std::path::Path;

use crate::error::Result;
use crate::model::Metric;

/// Extracts a metric from one replicate's output directory
pub trait Processor {
    fn process(&mut self, output_dir: &Path) -> Result<Metric>;
}

impl<F> Processor for F
where
    F: FnMut(&Path) -> Result<Metric>,
{
    fn process(&mut self, output_dir: &Path) -> Result<Metric> {
        self(output_dir)
    }
}
