//! Per-cell-type phenotype parameters

use serde::Serialize;

use super::bounds::{Constraint, bounded_fields};
use super::user::UserParameter;
use crate::error::ValidationError;

// ============================================================================
// Phases
// ============================================================================

/// How a phase list is expressed in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Durations,
    TransitionRates,
}

impl PhaseKind {
    /// Element holding the list
    pub fn list_tag(self) -> &'static str {
        match self {
            PhaseKind::Durations => "phase_durations",
            PhaseKind::TransitionRates => "phase_transition_rates",
        }
    }

    /// Element holding one entry of the list
    pub fn item_tag(self) -> &'static str {
        match self {
            PhaseKind::Durations => "duration",
            PhaseKind::TransitionRates => "rate",
        }
    }
}

/// Ordered, non-negative phase durations or transition rates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phases {
    kind: PhaseKind,
    values: Vec<f64>,
}

impl Phases {
    pub fn new(kind: PhaseKind, values: Vec<f64>) -> Result<Self, ValidationError> {
        for (index, value) in values.iter().enumerate() {
            Constraint::NonNegative.check(&phase_field(index), *value)?;
        }
        Ok(Self { kind, values })
    }

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Assigns one phase value. Returns `Ok(false)` when `index` is out of range.
    pub fn set(&mut self, index: usize, value: f64) -> Result<bool, ValidationError> {
        let checked = Constraint::NonNegative.check(&phase_field(index), value)?;
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = checked;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn phase_field(index: usize) -> String {
    format!("phase_{index}")
}

// ============================================================================
// Cycle and death
// ============================================================================

/// Cell cycle model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cycle {
    pub code: i32,
    pub phases: Option<Phases>,
}

/// Death model parameters (apoptosis, necrosis, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeathModel {
    pub name: String,
    pub code: i32,
    death_rate: f64,
    pub phases: Option<Phases>,
    unlysed_fluid_change_rate: f64,
    lysed_fluid_change_rate: f64,
    cytoplasmic_biomass_change_rate: f64,
    nuclear_biomass_change_rate: f64,
    calcification_rate: f64,
    relative_rupture_volume: f64,
}

bounded_fields!(DeathModel {
    death_rate / set_death_rate: Constraint::NonNegative,
    unlysed_fluid_change_rate / set_unlysed_fluid_change_rate: Constraint::NonNegative,
    lysed_fluid_change_rate / set_lysed_fluid_change_rate: Constraint::NonNegative,
    cytoplasmic_biomass_change_rate / set_cytoplasmic_biomass_change_rate: Constraint::NonNegative,
    nuclear_biomass_change_rate / set_nuclear_biomass_change_rate: Constraint::NonNegative,
    calcification_rate / set_calcification_rate: Constraint::NonNegative,
    relative_rupture_volume / set_relative_rupture_volume: Constraint::NonNegative,
});

impl DeathModel {
    pub fn new(name: impl Into<String>, code: i32) -> Self {
        Self {
            name: name.into(),
            code,
            death_rate: 0.0,
            phases: None,
            unlysed_fluid_change_rate: 0.0,
            lysed_fluid_change_rate: 0.0,
            cytoplasmic_biomass_change_rate: 0.0,
            nuclear_biomass_change_rate: 0.0,
            calcification_rate: 0.0,
            relative_rupture_volume: 0.0,
        }
    }
}

// ============================================================================
// Volume, mechanics, motility, secretion
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volume {
    total: f64,
    fluid_fraction: f64,
    nuclear: f64,
    fluid_change_rate: f64,
    cytoplasmic_biomass_change_rate: f64,
    nuclear_biomass_change_rate: f64,
    calcified_fraction: f64,
    calcification_rate: f64,
    relative_rupture_volume: f64,
}

bounded_fields!(Volume {
    total / set_total: Constraint::NonNegative,
    fluid_fraction / set_fluid_fraction: Constraint::UnitInterval,
    nuclear / set_nuclear: Constraint::NonNegative,
    fluid_change_rate / set_fluid_change_rate: Constraint::NonNegative,
    cytoplasmic_biomass_change_rate / set_cytoplasmic_biomass_change_rate: Constraint::NonNegative,
    nuclear_biomass_change_rate / set_nuclear_biomass_change_rate: Constraint::NonNegative,
    calcified_fraction / set_calcified_fraction: Constraint::UnitInterval,
    calcification_rate / set_calcification_rate: Constraint::NonNegative,
    relative_rupture_volume / set_relative_rupture_volume: Constraint::NonNegative,
});

impl Default for Volume {
    fn default() -> Self {
        Self {
            total: 2494.0,
            fluid_fraction: 0.75,
            nuclear: 540.0,
            fluid_change_rate: 0.05,
            cytoplasmic_biomass_change_rate: 0.0045,
            nuclear_biomass_change_rate: 0.0055,
            calcified_fraction: 0.0,
            calcification_rate: 0.0,
            relative_rupture_volume: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mechanics {
    cell_cell_adhesion_strength: f64,
    cell_cell_repulsion_strength: f64,
    relative_maximum_adhesion_distance: f64,
    relative_equilibrium_distance: Option<f64>,
    absolute_equilibrium_distance: Option<f64>,
}

bounded_fields!(Mechanics {
    cell_cell_adhesion_strength / set_cell_cell_adhesion_strength: Constraint::NonNegative,
    cell_cell_repulsion_strength / set_cell_cell_repulsion_strength: Constraint::NonNegative,
    relative_maximum_adhesion_distance / set_relative_maximum_adhesion_distance: Constraint::NonNegative,
});

impl Mechanics {
    pub fn relative_equilibrium_distance(&self) -> Option<f64> {
        self.relative_equilibrium_distance
    }

    pub fn set_relative_equilibrium_distance(
        &mut self,
        value: Option<f64>,
    ) -> Result<(), ValidationError> {
        self.relative_equilibrium_distance = value
            .map(|v| Constraint::NonNegative.check("relative_equilibrium_distance", v))
            .transpose()?;
        Ok(())
    }

    pub fn absolute_equilibrium_distance(&self) -> Option<f64> {
        self.absolute_equilibrium_distance
    }

    pub fn set_absolute_equilibrium_distance(
        &mut self,
        value: Option<f64>,
    ) -> Result<(), ValidationError> {
        self.absolute_equilibrium_distance = value
            .map(|v| Constraint::NonNegative.check("absolute_equilibrium_distance", v))
            .transpose()?;
        Ok(())
    }
}

impl Default for Mechanics {
    fn default() -> Self {
        Self {
            cell_cell_adhesion_strength: 0.4,
            cell_cell_repulsion_strength: 10.0,
            relative_maximum_adhesion_distance: 1.25,
            relative_equilibrium_distance: None,
            absolute_equilibrium_distance: None,
        }
    }
}

/// Directed migration along a substrate gradient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chemotaxis {
    pub enabled: bool,
    pub substrate: String,
    pub direction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Motility {
    speed: f64,
    persistence_time: f64,
    migration_bias: f64,
    pub enabled: bool,
    pub use_2d: bool,
    pub chemotaxis: Chemotaxis,
}

bounded_fields!(Motility {
    speed / set_speed: Constraint::NonNegative,
    persistence_time / set_persistence_time: Constraint::NonNegative,
    migration_bias / set_migration_bias: Constraint::UnitInterval,
});

impl Motility {
    pub fn new(speed: f64, persistence_time: f64, migration_bias: f64) -> Result<Self, ValidationError> {
        let mut motility = Self::default();
        motility.set_speed(speed)?;
        motility.set_persistence_time(persistence_time)?;
        motility.set_migration_bias(migration_bias)?;
        Ok(motility)
    }
}

impl Default for Motility {
    fn default() -> Self {
        Self {
            speed: 1.0,
            persistence_time: 1.0,
            migration_bias: 0.5,
            enabled: false,
            use_2d: true,
            chemotaxis: Chemotaxis {
                enabled: false,
                substrate: String::new(),
                direction: 1.0,
            },
        }
    }
}

/// Secretion and uptake of one substrate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Secretion {
    pub substrate: String,
    secretion_rate: f64,
    secretion_target: f64,
    uptake_rate: f64,
    net_export_rate: f64,
}

bounded_fields!(Secretion {
    secretion_rate / set_secretion_rate: Constraint::NonNegative,
    secretion_target / set_secretion_target: Constraint::NonNegative,
    uptake_rate / set_uptake_rate: Constraint::NonNegative,
    net_export_rate / set_net_export_rate: Constraint::NonNegative,
});

impl Secretion {
    pub fn new(substrate: impl Into<String>) -> Self {
        Self {
            substrate: substrate.into(),
            secretion_rate: 0.0,
            secretion_target: 1.0,
            uptake_rate: 0.0,
            net_export_rate: 0.0,
        }
    }
}

// ============================================================================
// Cell type
// ============================================================================

/// Every phenotype section of one cell definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellTypeParameters {
    pub name: String,
    pub cycle: Cycle,
    pub death: Vec<DeathModel>,
    pub volume: Volume,
    pub mechanics: Mechanics,
    pub motility: Motility,
    pub secretion: Vec<Secretion>,
    pub custom_data: Vec<UserParameter>,
}

impl CellTypeParameters {
    pub fn death_model(&self, name: &str) -> Option<&DeathModel> {
        self.death.iter().find(|m| m.name == name)
    }

    pub fn death_model_mut(&mut self, name: &str) -> Option<&mut DeathModel> {
        self.death.iter_mut().find(|m| m.name == name)
    }

    pub fn secretion_for(&self, substrate: &str) -> Option<&Secretion> {
        self.secretion.iter().find(|s| s.substrate == substrate)
    }

    pub fn custom(&self, name: &str) -> Option<&UserParameter> {
        self.custom_data.iter().find(|p| p.name == name)
    }

    pub fn custom_mut(&mut self, name: &str) -> Option<&mut UserParameter> {
        self.custom_data.iter_mut().find(|p| p.name == name)
    }
}
