//! Diffusing substances of the microenvironment

use serde::Serialize;

use super::bounds::{Constraint, bounded_fields};

/// Physical parameters of one diffusing species
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substance {
    pub name: String,
    diffusion_coefficient: f64,
    decay_rate: f64,
    initial_condition: f64,
    dirichlet_value: f64,
    pub dirichlet_enabled: bool,
}

bounded_fields!(Substance {
    diffusion_coefficient / set_diffusion_coefficient: Constraint::NonNegative,
    decay_rate / set_decay_rate: Constraint::NonNegative,
    initial_condition / set_initial_condition: Constraint::NonNegative,
    dirichlet_value / set_dirichlet_value: Constraint::NonNegative,
});

impl Substance {
    /// A substance with every rate at zero and the boundary condition off
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffusion_coefficient: 0.0,
            decay_rate: 0.0,
            initial_condition: 0.0,
            dirichlet_value: 0.0,
            dirichlet_enabled: false,
        }
    }
}
