//! Writing parameter vectors into the simulator configuration

use crate::address::resolve_all;
use crate::codec::ConfigCodec;
use crate::error::{Error, Result};
use crate::model::ParameterVector;
use crate::params::{CellTypeParameters, Selector};

/// Applies a parameter vector before the simulator runs
pub trait Updater {
    fn update(&mut self, params: &ParameterVector) -> Result<()>;
}

impl<F> Updater for F
where
    F: FnMut(&ParameterVector) -> Result<()>,
{
    fn update(&mut self, params: &ParameterVector) -> Result<()> {
        self(params)
    }
}

/// Updater driven by parameter paths (`cell/speed`, `me:oxygen/decay_rate`, ...)
///
/// Every name is resolved before the file is read, and every value is
/// applied in memory before anything is written, so an invalid vector leaves
/// the configuration untouched.
#[derive(Debug, Clone)]
pub struct PathUpdater {
    codec: ConfigCodec,
    cell_type: String,
}

impl PathUpdater {
    pub fn new(codec: ConfigCodec, cell_type: impl Into<String>) -> Self {
        Self {
            codec,
            cell_type: cell_type.into(),
        }
    }

    pub fn cell_type(&self) -> &str {
        &self.cell_type
    }

    /// Writes `params` into the configuration and returns how many stored
    /// values changed
    pub fn apply(&self, params: &ParameterVector) -> Result<usize> {
        let (paths, selector) = resolve_all(params.names(), &self.cell_type)?;
        if paths.is_empty() {
            return Ok(0);
        }
        let mut store = self.codec.read(&selector)?;
        for (path, (_, value)) in paths.iter().zip(params.iter()) {
            path.apply(&mut store, &self.cell_type, value)?;
        }
        self.codec.write(&store, &selector)
    }
}

impl Updater for PathUpdater {
    fn update(&mut self, params: &ParameterVector) -> Result<()> {
        self.apply(params).map(drop)
    }
}

/// Updater that hands one cell type's parameters to a closure
pub struct CellUpdater<F> {
    codec: ConfigCodec,
    cell_type: String,
    apply: F,
}

impl<F> CellUpdater<F>
where
    F: FnMut(&mut CellTypeParameters, &ParameterVector) -> Result<()>,
{
    pub fn new(codec: ConfigCodec, cell_type: impl Into<String>, apply: F) -> Self {
        Self {
            codec,
            cell_type: cell_type.into(),
            apply,
        }
    }
}

impl<F> Updater for CellUpdater<F>
where
    F: FnMut(&mut CellTypeParameters, &ParameterVector) -> Result<()>,
{
    fn update(&mut self, params: &ParameterVector) -> Result<()> {
        let selector = Selector::new().with_cell_type(self.cell_type.clone());
        let mut store = self.codec.read(&selector)?;
        let cell = store
            .cell_type_mut(&self.cell_type)
            .ok_or_else(|| Error::SectionNotLoaded(format!("cell type `{}`", self.cell_type)))?;
        (self.apply)(cell, params)?;
        self.codec.write(&store, &selector)?;
        Ok(())
    }
}
