//! Element layout of the PhysiCell settings file
//!
//! Field tables pair an element tag with the accessor pair of the typed
//! section it maps to, so reading and writing walk the same list.

use super::node::NodePath;
use crate::error::ValidationError;
use crate::params::{DeathModel, Mechanics, Motility, Overall, Secretion, Substance, Volume};

pub(crate) type Field<T> = (
    &'static str,
    fn(&T) -> f64,
    fn(&mut T, f64) -> Result<(), ValidationError>,
);

pub(crate) const OVERALL_FIELDS: [Field<Overall>; 4] = [
    ("max_time", Overall::max_time, Overall::set_max_time),
    ("dt_diffusion", Overall::dt_diffusion, Overall::set_dt_diffusion),
    ("dt_mechanics", Overall::dt_mechanics, Overall::set_dt_mechanics),
    ("dt_phenotype", Overall::dt_phenotype, Overall::set_dt_phenotype),
];

/// Fields under `variable/physical_parameter_set`
pub(crate) const PHYSICAL_FIELDS: [Field<Substance>; 2] = [
    (
        "diffusion_coefficient",
        Substance::diffusion_coefficient,
        Substance::set_diffusion_coefficient,
    ),
    ("decay_rate", Substance::decay_rate, Substance::set_decay_rate),
];

/// Fields under `death/model/parameters`
pub(crate) const DEATH_PARAMETER_FIELDS: [Field<DeathModel>; 6] = [
    (
        "unlysed_fluid_change_rate",
        DeathModel::unlysed_fluid_change_rate,
        DeathModel::set_unlysed_fluid_change_rate,
    ),
    (
        "lysed_fluid_change_rate",
        DeathModel::lysed_fluid_change_rate,
        DeathModel::set_lysed_fluid_change_rate,
    ),
    (
        "cytoplasmic_biomass_change_rate",
        DeathModel::cytoplasmic_biomass_change_rate,
        DeathModel::set_cytoplasmic_biomass_change_rate,
    ),
    (
        "nuclear_biomass_change_rate",
        DeathModel::nuclear_biomass_change_rate,
        DeathModel::set_nuclear_biomass_change_rate,
    ),
    (
        "calcification_rate",
        DeathModel::calcification_rate,
        DeathModel::set_calcification_rate,
    ),
    (
        "relative_rupture_volume",
        DeathModel::relative_rupture_volume,
        DeathModel::set_relative_rupture_volume,
    ),
];

pub(crate) const VOLUME_FIELDS: [Field<Volume>; 9] = [
    ("total", Volume::total, Volume::set_total),
    ("fluid_fraction", Volume::fluid_fraction, Volume::set_fluid_fraction),
    ("nuclear", Volume::nuclear, Volume::set_nuclear),
    ("fluid_change_rate", Volume::fluid_change_rate, Volume::set_fluid_change_rate),
    (
        "cytoplasmic_biomass_change_rate",
        Volume::cytoplasmic_biomass_change_rate,
        Volume::set_cytoplasmic_biomass_change_rate,
    ),
    (
        "nuclear_biomass_change_rate",
        Volume::nuclear_biomass_change_rate,
        Volume::set_nuclear_biomass_change_rate,
    ),
    ("calcified_fraction", Volume::calcified_fraction, Volume::set_calcified_fraction),
    ("calcification_rate", Volume::calcification_rate, Volume::set_calcification_rate),
    (
        "relative_rupture_volume",
        Volume::relative_rupture_volume,
        Volume::set_relative_rupture_volume,
    ),
];

pub(crate) const MECHANICS_FIELDS: [Field<Mechanics>; 3] = [
    (
        "cell_cell_adhesion_strength",
        Mechanics::cell_cell_adhesion_strength,
        Mechanics::set_cell_cell_adhesion_strength,
    ),
    (
        "cell_cell_repulsion_strength",
        Mechanics::cell_cell_repulsion_strength,
        Mechanics::set_cell_cell_repulsion_strength,
    ),
    (
        "relative_maximum_adhesion_distance",
        Mechanics::relative_maximum_adhesion_distance,
        Mechanics::set_relative_maximum_adhesion_distance,
    ),
];

pub(crate) const MOTILITY_FIELDS: [Field<Motility>; 3] = [
    ("speed", Motility::speed, Motility::set_speed),
    ("persistence_time", Motility::persistence_time, Motility::set_persistence_time),
    ("migration_bias", Motility::migration_bias, Motility::set_migration_bias),
];

pub(crate) const SECRETION_FIELDS: [Field<Secretion>; 4] = [
    ("secretion_rate", Secretion::secretion_rate, Secretion::set_secretion_rate),
    ("secretion_target", Secretion::secretion_target, Secretion::set_secretion_target),
    ("uptake_rate", Secretion::uptake_rate, Secretion::set_uptake_rate),
    ("net_export_rate", Secretion::net_export_rate, Secretion::set_net_export_rate),
];

pub(crate) const RELATIVE_EQUILIBRIUM: &str = "set_relative_equilibrium_distance";
pub(crate) const ABSOLUTE_EQUILIBRIUM: &str = "set_absolute_equilibrium_distance";

// ============================================================================
// Paths
// ============================================================================

pub(crate) fn domain() -> NodePath {
    NodePath::root().child("domain")
}

pub(crate) fn overall() -> NodePath {
    NodePath::root().child("overall")
}

pub(crate) fn microenvironment() -> NodePath {
    NodePath::root().child("microenvironment_setup")
}

pub(crate) fn substance(name: &str) -> NodePath {
    microenvironment().named("variable", name)
}

pub(crate) fn cell_definitions() -> NodePath {
    NodePath::root().child("cell_definitions")
}

pub(crate) fn cell_definition(name: &str) -> NodePath {
    cell_definitions().named("cell_definition", name)
}

pub(crate) fn phenotype(cell_type: &str) -> NodePath {
    cell_definition(cell_type).child("phenotype")
}

pub(crate) fn custom_data(cell_type: &str) -> NodePath {
    cell_definition(cell_type).child("custom_data")
}

pub(crate) fn user_parameters() -> NodePath {
    NodePath::root().child("user_parameters")
}
