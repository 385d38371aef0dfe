//! Typed, validated view of the simulator configuration
//!
//! A [`ParameterStore`] only holds the sections a [`Selector`] asked for.
//! Bounded numeric fields are private and can only change through setters
//! that return [`ValidationError`](crate::error::ValidationError).

mod bounds;
pub mod cell;
pub mod domain;
pub mod substance;
pub mod user;

use serde::Serialize;

pub use bounds::Constraint;
pub use cell::{
    CellTypeParameters, Chemotaxis, Cycle, DeathModel, Mechanics, Motility, PhaseKind, Phases,
    Secretion, Volume,
};
pub use domain::{Axis, AxisRange, Domain, Overall};
pub use substance::Substance;
pub use user::{UserParameter, UserValue};

/// In-memory subset of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterStore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<Overall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substances: Option<Vec<Substance>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cell_types: Vec<CellTypeParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_parameters: Option<Vec<UserParameter>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn substance(&self, name: &str) -> Option<&Substance> {
        self.substances.as_ref()?.iter().find(|s| s.name == name)
    }

    pub fn substance_mut(&mut self, name: &str) -> Option<&mut Substance> {
        self.substances.as_mut()?.iter_mut().find(|s| s.name == name)
    }

    pub fn cell_type(&self, name: &str) -> Option<&CellTypeParameters> {
        self.cell_types.iter().find(|c| c.name == name)
    }

    pub fn cell_type_mut(&mut self, name: &str) -> Option<&mut CellTypeParameters> {
        self.cell_types.iter_mut().find(|c| c.name == name)
    }

    pub fn user_parameter(&self, name: &str) -> Option<&UserParameter> {
        self.user_parameters.as_ref()?.iter().find(|p| p.name == name)
    }

    pub fn user_parameter_mut(&mut self, name: &str) -> Option<&mut UserParameter> {
        self.user_parameters
            .as_mut()?
            .iter_mut()
            .find(|p| p.name == name)
    }
}

/// Which cell definitions a selector covers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellTypeSelection {
    #[default]
    None,
    All,
    Named(Vec<String>),
}

/// Names the configuration sections to read or write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub domain: bool,
    pub overall: bool,
    pub microenvironment: bool,
    pub cell_types: CellTypeSelection,
    pub user_parameters: bool,
}

impl Selector {
    /// A selector covering nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// A selector covering every section and every cell type
    pub fn all() -> Self {
        Self {
            domain: true,
            overall: true,
            microenvironment: true,
            cell_types: CellTypeSelection::All,
            user_parameters: true,
        }
    }

    pub fn with_domain(mut self) -> Self {
        self.domain = true;
        self
    }

    pub fn with_overall(mut self) -> Self {
        self.overall = true;
        self
    }

    pub fn with_microenvironment(mut self) -> Self {
        self.microenvironment = true;
        self
    }

    pub fn with_user_parameters(mut self) -> Self {
        self.user_parameters = true;
        self
    }

    pub fn with_all_cell_types(mut self) -> Self {
        self.cell_types = CellTypeSelection::All;
        self
    }

    pub fn with_cell_type(mut self, name: impl Into<String>) -> Self {
        self.add_cell_type(name.into());
        self
    }

    fn add_cell_type(&mut self, name: String) {
        match &mut self.cell_types {
            CellTypeSelection::All => {}
            CellTypeSelection::Named(names) => {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            CellTypeSelection::None => self.cell_types = CellTypeSelection::Named(vec![name]),
        }
    }

    /// Extends this selector with every section `other` covers
    pub fn merge(&mut self, other: &Selector) {
        self.domain |= other.domain;
        self.overall |= other.overall;
        self.microenvironment |= other.microenvironment;
        self.user_parameters |= other.user_parameters;
        match &other.cell_types {
            CellTypeSelection::None => {}
            CellTypeSelection::All => self.cell_types = CellTypeSelection::All,
            CellTypeSelection::Named(names) => {
                for name in names {
                    self.add_cell_type(name.clone());
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Selector::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_deduplicates_cell_types() {
        let mut selector = Selector::new().with_cell_type("default");
        selector.merge(&Selector::new().with_cell_type("default").with_microenvironment());
        assert_eq!(
            selector.cell_types,
            CellTypeSelection::Named(vec!["default".to_string()])
        );
        assert!(selector.microenvironment);
    }

    #[test]
    fn all_absorbs_named() {
        let mut selector = Selector::new().with_all_cell_types();
        selector.merge(&Selector::new().with_cell_type("cancer"));
        assert_eq!(selector.cell_types, CellTypeSelection::All);
    }

    #[test]
    fn empty_selector() {
        assert!(Selector::new().is_empty());
        assert!(!Selector::new().with_domain().is_empty());
    }
}
