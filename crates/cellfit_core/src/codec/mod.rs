//! Reading and writing the simulator's XML settings file
//!
//! [`ConfigCodec::read`] materializes the sections named by a [`Selector`]
//! into a [`ParameterStore`]. [`ConfigCodec::write`] applies a store back onto
//! the file by replacing the text of exactly the nodes it covers; every other
//! byte of the file (comments, formatting, unrelated sections) is preserved.
//! The new content is computed in memory and swapped in atomically, so a
//! failed write leaves the file untouched.

pub(crate) mod node;
mod read;
mod schema;
mod write;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::params::{ParameterStore, Selector};
use crate::util::atomic_write;

pub use node::NodePath;

use node::ConfigDocument;
use write::EditPlan;

/// Bidirectional mapping between a settings file and a [`ParameterStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCodec {
    path: PathBuf,
}

impl ConfigCodec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(Error::io(&self.path))
    }

    /// Parses the sections named by `selector`
    pub fn read(&self, selector: &Selector) -> Result<ParameterStore> {
        let text = self.load()?;
        let doc = ConfigDocument::parse(&text, &self.path)?;
        let store = read::read_store(&doc, selector)?;
        debug!(path = %self.path.display(), cell_types = store.cell_types.len(), "read configuration");
        Ok(store)
    }

    /// Writes the sections named by `selector` from `store`.
    ///
    /// Returns the number of values that changed in the file.
    pub fn write(&self, store: &ParameterStore, selector: &Selector) -> Result<usize> {
        let text = self.load()?;
        let doc = ConfigDocument::parse(&text, &self.path)?;
        let mut plan = EditPlan::new(&doc);
        write::plan_store(&mut plan, store, selector)?;

        let changed = plan.len();
        if changed == 0 {
            debug!(path = %self.path.display(), "configuration already up to date");
            return Ok(0);
        }
        let output = plan.apply();
        atomic_write(&self.path, &output).map_err(Error::io(&self.path))?;
        info!(path = %self.path.display(), changed, "updated configuration");
        Ok(changed)
    }

    /// Names of every cell definition in file order
    pub fn cell_type_names(&self) -> Result<Vec<String>> {
        let text = self.load()?;
        let doc = ConfigDocument::parse(&text, &self.path)?;
        read::cell_type_names(&doc)
    }

    /// Names of every microenvironment substance in file order
    pub fn substance_names(&self) -> Result<Vec<String>> {
        let text = self.load()?;
        let doc = ConfigDocument::parse(&text, &self.path)?;
        read::substance_names(&doc)
    }
}
