//! XML document to typed sections

use tracing::debug;

use super::node::{ConfigDocument, NodePath};
use super::schema::{self, Field};
use crate::error::{ParseError, Result};
use crate::params::{
    Axis, AxisRange, CellTypeParameters, CellTypeSelection, Chemotaxis, Cycle, DeathModel, Domain,
    Mechanics, Motility, Overall, ParameterStore, PhaseKind, Phases, Secretion, Selector,
    Substance, UserParameter, UserValue, Volume,
};

pub(crate) fn read_store(doc: &ConfigDocument<'_>, selector: &Selector) -> Result<ParameterStore> {
    let mut store = ParameterStore::new();
    if selector.domain {
        store.domain = Some(read_domain(doc)?);
    }
    if selector.overall {
        store.overall = Some(read_overall(doc)?);
    }
    if selector.microenvironment {
        store.substances = Some(read_substances(doc)?);
    }
    let names = match &selector.cell_types {
        CellTypeSelection::None => Vec::new(),
        CellTypeSelection::All => cell_type_names(doc)?,
        CellTypeSelection::Named(names) => names.clone(),
    };
    for name in &names {
        store.cell_types.push(read_cell_type(doc, name)?);
    }
    if selector.user_parameters {
        store.user_parameters = Some(read_user_entries(doc, &schema::user_parameters())?);
    }
    Ok(store)
}

pub(crate) fn cell_type_names(doc: &ConfigDocument<'_>) -> Result<Vec<String>> {
    Ok(doc.child_attributes(&schema::cell_definitions(), "cell_definition", "name")?)
}

pub(crate) fn substance_names(doc: &ConfigDocument<'_>) -> Result<Vec<String>> {
    Ok(doc.child_attributes(&schema::microenvironment(), "variable", "name")?)
}

fn read_fields<T>(doc: &ConfigDocument<'_>, base: &NodePath, fields: &[Field<T>], target: &mut T) -> Result<()> {
    for (tag, _, set) in fields {
        set(target, doc.number(&base.child(tag))?)?;
    }
    Ok(())
}

fn read_domain(doc: &ConfigDocument<'_>) -> Result<Domain> {
    let base = schema::domain();
    let mut ranges = Vec::with_capacity(3);
    for axis in Axis::ALL {
        let min = doc.number(&base.child(&format!("{}_min", axis.as_str())))?;
        let max = doc.number(&base.child(&format!("{}_max", axis.as_str())))?;
        ranges.push(AxisRange::new(axis, min, max)?);
    }
    let spacing = [
        doc.number(&base.child("dx"))?,
        doc.number(&base.child("dy"))?,
        doc.number(&base.child("dz"))?,
    ];
    let use_2d = doc.flag(&base.child("use_2D"))?;
    Ok(Domain::new(ranges[0], ranges[1], ranges[2], spacing, use_2d)?)
}

fn read_overall(doc: &ConfigDocument<'_>) -> Result<Overall> {
    let mut overall = Overall::default();
    read_fields(doc, &schema::overall(), &schema::OVERALL_FIELDS, &mut overall)?;
    Ok(overall)
}

fn read_substances(doc: &ConfigDocument<'_>) -> Result<Vec<Substance>> {
    substance_names(doc)?
        .into_iter()
        .map(|name| read_substance(doc, name))
        .collect()
}

fn read_substance(doc: &ConfigDocument<'_>, name: String) -> Result<Substance> {
    let base = schema::substance(&name);
    let mut substance = Substance::new(name);
    read_fields(
        doc,
        &base.child("physical_parameter_set"),
        &schema::PHYSICAL_FIELDS,
        &mut substance,
    )?;
    substance.set_initial_condition(doc.number(&base.child("initial_condition"))?)?;

    let boundary = base.child("Dirichlet_boundary_condition");
    substance.set_dirichlet_value(doc.number(&boundary)?)?;
    let enabled = doc.attribute(&boundary, "enabled")?;
    substance.dirichlet_enabled = super::node::parse_flag(enabled).ok_or_else(|| ParseError::InvalidValue {
        node: format!("{boundary}/@enabled"),
        text: enabled.to_string(),
    })?;
    Ok(substance)
}

fn read_cell_type(doc: &ConfigDocument<'_>, name: &str) -> Result<CellTypeParameters> {
    let phenotype = schema::phenotype(name);
    doc.node(&phenotype)?;

    let cycle_path = phenotype.child("cycle");
    let cycle = Cycle {
        code: doc.integer_attribute(&cycle_path, "code")?,
        phases: read_phases(doc, &cycle_path)?,
    };

    let death_path = phenotype.child("death");
    let mut death = Vec::new();
    if doc.find(&death_path).is_some() {
        for model_name in doc.child_attributes(&death_path, "model", "name")? {
            death.push(read_death_model(doc, &death_path, model_name)?);
        }
    }

    let mut volume = Volume::default();
    read_fields(doc, &phenotype.child("volume"), &schema::VOLUME_FIELDS, &mut volume)?;

    let mechanics_path = phenotype.child("mechanics");
    let mut mechanics = Mechanics::default();
    read_fields(doc, &mechanics_path, &schema::MECHANICS_FIELDS, &mut mechanics)?;
    let options = mechanics_path.child("options");
    mechanics.set_relative_equilibrium_distance(
        doc.optional_number(&options.child(schema::RELATIVE_EQUILIBRIUM))?,
    )?;
    mechanics.set_absolute_equilibrium_distance(
        doc.optional_number(&options.child(schema::ABSOLUTE_EQUILIBRIUM))?,
    )?;

    let motility = read_motility(doc, &phenotype.child("motility"))?;

    let secretion_path = phenotype.child("secretion");
    let mut secretion = Vec::new();
    if doc.find(&secretion_path).is_some() {
        for substrate in doc.child_attributes(&secretion_path, "substrate", "name")? {
            let mut entry = Secretion::new(substrate);
            let base = secretion_path.named("substrate", &entry.substrate);
            read_fields(doc, &base, &schema::SECRETION_FIELDS, &mut entry)?;
            secretion.push(entry);
        }
    }

    let custom_path = schema::custom_data(name);
    let custom_data = match doc.find(&custom_path) {
        Some(_) => read_user_entries(doc, &custom_path)?,
        None => Vec::new(),
    };

    Ok(CellTypeParameters {
        name: name.to_string(),
        cycle,
        death,
        volume,
        mechanics,
        motility,
        secretion,
        custom_data,
    })
}

/// Reads whichever phase list `base` holds, if any
fn read_phases(doc: &ConfigDocument<'_>, base: &NodePath) -> Result<Option<Phases>> {
    for kind in [PhaseKind::Durations, PhaseKind::TransitionRates] {
        let list = base.child(kind.list_tag());
        if doc.find(&list).is_some() {
            let values = doc.numbers(&list, kind.item_tag())?;
            return Ok(Some(Phases::new(kind, values)?));
        }
    }
    Ok(None)
}

fn read_death_model(doc: &ConfigDocument<'_>, death: &NodePath, name: String) -> Result<DeathModel> {
    let base = death.named("model", &name);
    let mut model = DeathModel::new(name, doc.integer_attribute(&base, "code")?);
    model.set_death_rate(doc.number(&base.child("death_rate"))?)?;
    model.phases = read_phases(doc, &base)?;
    let parameters = base.child("parameters");
    if doc.find(&parameters).is_some() {
        read_fields(doc, &parameters, &schema::DEATH_PARAMETER_FIELDS, &mut model)?;
    }
    Ok(model)
}

fn read_motility(doc: &ConfigDocument<'_>, base: &NodePath) -> Result<Motility> {
    let mut motility = Motility::default();
    read_fields(doc, base, &schema::MOTILITY_FIELDS, &mut motility)?;

    let options = base.child("options");
    motility.enabled = doc.flag(&options.child("enabled"))?;
    motility.use_2d = doc.flag(&options.child("use_2D"))?;

    let chemotaxis = options.child("chemotaxis");
    if doc.find(&chemotaxis).is_some() {
        motility.chemotaxis = Chemotaxis {
            enabled: doc.flag(&chemotaxis.child("enabled"))?,
            substrate: doc.text(&chemotaxis.child("substrate"))?.to_string(),
            direction: doc.number(&chemotaxis.child("direction"))?,
        };
    }
    Ok(motility)
}

/// Reads every child element of `base` as a typed scalar.
///
/// The `type` attribute selects the variant (double when absent). Entries
/// without text are skipped unless they are strings.
fn read_user_entries(doc: &ConfigDocument<'_>, base: &NodePath) -> Result<Vec<UserParameter>> {
    let mut entries = Vec::new();
    for node in doc.node(base)?.children().filter(|n| n.is_element()) {
        let name = node.tag_name().name();
        let text = node.text().map(str::trim).unwrap_or("");
        let kind = node.attribute("type").unwrap_or("double");
        let invalid = || ParseError::InvalidValue {
            node: base.child(name).to_string(),
            text: text.to_string(),
        };

        if kind != "string" && text.is_empty() {
            debug!(parameter = name, "skipping user parameter without a value");
            continue;
        }
        let value = match kind {
            "int" => UserValue::Int(text.parse().map_err(|_| invalid())?),
            "bool" => UserValue::Bool(super::node::parse_flag(text).ok_or_else(invalid)?),
            "string" => UserValue::Text(text.to_string()),
            _ => UserValue::Double(super::node::parse_number(text).ok_or_else(invalid)?),
        };
        entries.push(UserParameter::new(name, value)?);
    }
    Ok(entries)
}
