//! Parameter addressing
//!
//! Sweeps and updaters name parameters with short strings:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `cell/<field>` | field of the updater's cell type (`speed`, `total`, `phase_2`, ...) |
//! | `me:<substance>/<field>` | field of a microenvironment substance |
//! | `<name>` | a user parameter |
//!
//! Parsing and [`Display`](fmt::Display) are inverse for every supported path.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ResolutionError, Result};
use crate::params::{CellTypeParameters, ParameterStore, Selector, Substance};

/// A field of a cell type that can be assigned a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellField {
    Speed,
    PersistenceTime,
    MigrationBias,
    AdhesionStrength,
    RepulsionStrength,
    MaxAdhesionDistance,
    TotalVolume,
    FluidFraction,
    NuclearVolume,
    FluidChangeRate,
    CytoplasmicBiomassChangeRate,
    NuclearBiomassChangeRate,
    CalcifiedFraction,
    CalcificationRate,
    RelativeRuptureVolume,
    Phase(usize),
}

const NAMED_CELL_FIELDS: [(&str, CellField); 15] = [
    ("speed", CellField::Speed),
    ("persistence_time", CellField::PersistenceTime),
    ("migration_bias", CellField::MigrationBias),
    ("cell_cell_adhesion_strength", CellField::AdhesionStrength),
    ("cell_cell_repulsion_strength", CellField::RepulsionStrength),
    ("relative_maximum_adhesion_distance", CellField::MaxAdhesionDistance),
    ("total", CellField::TotalVolume),
    ("fluid_fraction", CellField::FluidFraction),
    ("nuclear", CellField::NuclearVolume),
    ("fluid_change_rate", CellField::FluidChangeRate),
    ("cytoplasmic_biomass_change_rate", CellField::CytoplasmicBiomassChangeRate),
    ("nuclear_biomass_change_rate", CellField::NuclearBiomassChangeRate),
    ("calcified_fraction", CellField::CalcifiedFraction),
    ("calcification_rate", CellField::CalcificationRate),
    ("relative_rupture_volume", CellField::RelativeRuptureVolume),
];

impl CellField {
    fn apply(self, cell: &mut CellTypeParameters, value: f64) -> Result<()> {
        let volume = &mut cell.volume;
        let mechanics = &mut cell.mechanics;
        let motility = &mut cell.motility;
        match self {
            CellField::Speed => motility.set_speed(value)?,
            CellField::PersistenceTime => motility.set_persistence_time(value)?,
            CellField::MigrationBias => motility.set_migration_bias(value)?,
            CellField::AdhesionStrength => mechanics.set_cell_cell_adhesion_strength(value)?,
            CellField::RepulsionStrength => mechanics.set_cell_cell_repulsion_strength(value)?,
            CellField::MaxAdhesionDistance => {
                mechanics.set_relative_maximum_adhesion_distance(value)?
            }
            CellField::TotalVolume => volume.set_total(value)?,
            CellField::FluidFraction => volume.set_fluid_fraction(value)?,
            CellField::NuclearVolume => volume.set_nuclear(value)?,
            CellField::FluidChangeRate => volume.set_fluid_change_rate(value)?,
            CellField::CytoplasmicBiomassChangeRate => {
                volume.set_cytoplasmic_biomass_change_rate(value)?
            }
            CellField::NuclearBiomassChangeRate => volume.set_nuclear_biomass_change_rate(value)?,
            CellField::CalcifiedFraction => volume.set_calcified_fraction(value)?,
            CellField::CalcificationRate => volume.set_calcification_rate(value)?,
            CellField::RelativeRuptureVolume => volume.set_relative_rupture_volume(value)?,
            CellField::Phase(index) => {
                let count = cell.cycle.phases.as_ref().map_or(0, |p| p.len());
                let phases = cell
                    .cycle
                    .phases
                    .as_mut()
                    .ok_or(ResolutionError::PhaseOutOfRange { index, count })?;
                if !phases.set(index, value)? {
                    return Err(ResolutionError::PhaseOutOfRange { index, count }.into());
                }
            }
        }
        Ok(())
    }
}

impl FromStr for CellField {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((_, field)) = NAMED_CELL_FIELDS.iter().find(|(name, _)| *name == s) {
            return Ok(*field);
        }
        s.strip_prefix("phase_")
            .filter(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|index| index.parse().ok())
            .map(CellField::Phase)
            .ok_or_else(|| ResolutionError::UnknownCellField(s.to_string()))
    }
}

impl fmt::Display for CellField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let CellField::Phase(index) = self {
            return write!(f, "phase_{index}");
        }
        let name = NAMED_CELL_FIELDS
            .iter()
            .find(|(_, field)| field == self)
            .map_or("?", |(name, _)| name);
        f.write_str(name)
    }
}

/// A field of a microenvironment substance that can be assigned a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstanceField {
    DiffusionCoefficient,
    DecayRate,
    InitialCondition,
    DirichletBoundaryCondition,
}

impl SubstanceField {
    fn as_str(self) -> &'static str {
        match self {
            SubstanceField::DiffusionCoefficient => "diffusion_coefficient",
            SubstanceField::DecayRate => "decay_rate",
            SubstanceField::InitialCondition => "initial_condition",
            SubstanceField::DirichletBoundaryCondition => "dirichlet_boundary_condition",
        }
    }

    fn apply(self, substance: &mut Substance, value: f64) -> Result<()> {
        match self {
            SubstanceField::DiffusionCoefficient => substance.set_diffusion_coefficient(value)?,
            SubstanceField::DecayRate => substance.set_decay_rate(value)?,
            SubstanceField::InitialCondition => substance.set_initial_condition(value)?,
            SubstanceField::DirichletBoundaryCondition => substance.set_dirichlet_value(value)?,
        }
        Ok(())
    }
}

impl FromStr for SubstanceField {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diffusion_coefficient" => Ok(SubstanceField::DiffusionCoefficient),
            "decay_rate" => Ok(SubstanceField::DecayRate),
            "initial_condition" => Ok(SubstanceField::InitialCondition),
            "dirichlet_boundary_condition" => Ok(SubstanceField::DirichletBoundaryCondition),
            _ => Err(ResolutionError::UnknownSubstanceField(s.to_string())),
        }
    }
}

/// Parsed parameter address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterPath {
    Cell(CellField),
    Substance { substance: String, field: SubstanceField },
    User(String),
}

impl ParameterPath {
    /// Sections that must be loaded to apply this path to `cell_type`
    pub fn selector(&self, cell_type: &str) -> Selector {
        match self {
            ParameterPath::Cell(_) => Selector::new().with_cell_type(cell_type),
            ParameterPath::Substance { .. } => Selector::new().with_microenvironment(),
            ParameterPath::User(_) => Selector::new().with_user_parameters(),
        }
    }

    /// Assigns `value` to the addressed field.
    ///
    /// `cell_type` names the cell definition `cell/...` paths refer to.
    pub fn apply(&self, store: &mut ParameterStore, cell_type: &str, value: f64) -> Result<()> {
        match self {
            ParameterPath::Cell(field) => {
                let cell = store
                    .cell_type_mut(cell_type)
                    .ok_or_else(|| Error::SectionNotLoaded(format!("cell type `{cell_type}`")))?;
                field.apply(cell, value)
            }
            ParameterPath::Substance { substance, field } => {
                let target = store
                    .substance_mut(substance)
                    .ok_or_else(|| ResolutionError::UnknownSubstance(substance.clone()))?;
                field.apply(target, value)
            }
            ParameterPath::User(name) => {
                let parameter = store
                    .user_parameter_mut(name)
                    .ok_or_else(|| ResolutionError::UnknownUserParameter(name.clone()))?;
                parameter.assign_number(value)?;
                Ok(())
            }
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl FromStr for ParameterPath {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ResolutionError::Malformed(s.to_string());

        if let Some(field) = s.strip_prefix("cell/") {
            return Ok(ParameterPath::Cell(field.parse()?));
        }
        if let Some(rest) = s.strip_prefix("me:") {
            let (substance, field) = rest.split_once('/').ok_or_else(malformed)?;
            if substance.is_empty() {
                return Err(malformed());
            }
            return Ok(ParameterPath::Substance {
                substance: substance.to_string(),
                field: field.parse()?,
            });
        }
        if is_identifier(s) {
            Ok(ParameterPath::User(s.to_string()))
        } else {
            Err(malformed())
        }
    }
}

impl fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterPath::Cell(field) => write!(f, "cell/{field}"),
            ParameterPath::Substance { substance, field } => {
                write!(f, "me:{substance}/{}", field.as_str())
            }
            ParameterPath::User(name) => f.write_str(name),
        }
    }
}

/// Parses every name and merges the sections they need
pub fn resolve_all<'a>(
    names: impl IntoIterator<Item = &'a str>,
    cell_type: &str,
) -> Result<(Vec<ParameterPath>, Selector), ResolutionError> {
    let mut selector = Selector::new();
    let mut paths = Vec::new();
    for name in names {
        let path: ParameterPath = name.parse()?;
        selector.merge(&path.selector(cell_type));
        paths.push(path);
    }
    Ok((paths, selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CellTypeSelection;

    #[test]
    fn parses_three_forms() {
        assert_eq!(
            "cell/speed".parse::<ParameterPath>(),
            Ok(ParameterPath::Cell(CellField::Speed))
        );
        assert_eq!(
            "me:oxygen/decay_rate".parse::<ParameterPath>(),
            Ok(ParameterPath::Substance {
                substance: "oxygen".into(),
                field: SubstanceField::DecayRate
            })
        );
        assert_eq!(
            "random_seed".parse::<ParameterPath>(),
            Ok(ParameterPath::User("random_seed".into()))
        );
        assert_eq!(
            "cell/phase_3".parse::<ParameterPath>(),
            Ok(ParameterPath::Cell(CellField::Phase(3)))
        );
    }

    #[test]
    fn rejects_unsupported_paths() {
        assert_eq!(
            "cell/colour".parse::<ParameterPath>(),
            Err(ResolutionError::UnknownCellField("colour".into()))
        );
        assert_eq!(
            "cell/phase_".parse::<ParameterPath>(),
            Err(ResolutionError::UnknownCellField("phase_".into()))
        );
        assert_eq!(
            "me:oxygen/colour".parse::<ParameterPath>(),
            Err(ResolutionError::UnknownSubstanceField("colour".into()))
        );
        assert!(matches!(
            "me:oxygen".parse::<ParameterPath>(),
            Err(ResolutionError::Malformed(_))
        ));
        assert!(matches!(
            "a/b".parse::<ParameterPath>(),
            Err(ResolutionError::Malformed(_))
        ));
        assert!(matches!("".parse::<ParameterPath>(), Err(ResolutionError::Malformed(_))));
    }

    #[test]
    fn display_inverts_parse() {
        let mut names: Vec<String> = NAMED_CELL_FIELDS
            .iter()
            .map(|(name, _)| format!("cell/{name}"))
            .collect();
        names.extend([
            "cell/phase_0".to_string(),
            "me:oxygen/diffusion_coefficient".to_string(),
            "me:substrate/dirichlet_boundary_condition".to_string(),
            "number_of_cells".to_string(),
        ]);
        for name in names {
            let path: ParameterPath = name.parse().unwrap();
            assert_eq!(path.to_string(), name);
        }
    }

    #[test]
    fn resolve_all_merges_sections() {
        let (paths, selector) =
            resolve_all(["cell/speed", "me:oxygen/decay_rate", "cell/total"], "default").unwrap();
        assert_eq!(paths.len(), 3);
        assert!(selector.microenvironment);
        assert!(!selector.user_parameters);
        assert_eq!(
            selector.cell_types,
            CellTypeSelection::Named(vec!["default".into()])
        );
    }
}
