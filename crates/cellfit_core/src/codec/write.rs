//! Typed sections to in-place byte edits
//!
//! Writing never re-serializes the document. Each changed value becomes an
//! [`Edit`] over the original text, and the edits are spliced into a copy of
//! the input once every target node has been located. Values that already
//! match the file produce no edit, so their bytes stay as they were.

use std::fmt::Display;
use std::ops::Range;

use roxmltree::Node;

use super::node::{ConfigDocument, NodePath, parse_flag, parse_number};
use super::schema::{self, Field};
use crate::error::{Error, ParseError, Result};
use crate::params::{
    CellTypeParameters, CellTypeSelection, DeathModel, Domain, Motility, Overall, ParameterStore,
    Phases, Selector, Substance, UserParameter, UserValue,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// Pending edits against one parsed document
pub(crate) struct EditPlan<'d, 'input> {
    doc: &'d ConfigDocument<'input>,
    edits: Vec<Edit>,
}

impl<'d, 'input> EditPlan<'d, 'input> {
    pub fn new(doc: &'d ConfigDocument<'input>) -> Self {
        Self {
            doc,
            edits: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn push(&mut self, edit: Edit) {
        self.edits.retain(|e| e.range != edit.range);
        self.edits.push(edit);
    }

    pub fn set_number(&mut self, path: &NodePath, value: f64) -> Result<(), ParseError> {
        let doc = self.doc;
        let node = doc.node(path)?;
        self.set_node_number(node, path, value)
    }

    pub fn set_flag(&mut self, path: &NodePath, value: bool) -> Result<(), ParseError> {
        let doc = self.doc;
        let node = doc.node(path)?;
        self.replace_text(node, path, bool_text(value), |current| {
            parse_flag(current) == Some(value)
        })
    }

    pub fn set_string(&mut self, path: &NodePath, value: &str) -> Result<(), ParseError> {
        let doc = self.doc;
        let node = doc.node(path)?;
        self.replace_text(node, path, value, |current| current == value)
    }

    fn set_node_number(
        &mut self,
        node: Node<'_, 'input>,
        label: &dyn Display,
        value: f64,
    ) -> Result<(), ParseError> {
        self.replace_text(node, label, &format_number(value), |current| {
            parse_number(current) == Some(value)
        })
    }

    /// Replaces the text content of a leaf element unless `unchanged` holds
    /// for its current (trimmed, unescaped) text
    fn replace_text(
        &mut self,
        node: Node<'_, 'input>,
        label: &dyn Display,
        value: &str,
        unchanged: impl Fn(&str) -> bool,
    ) -> Result<(), ParseError> {
        if node.children().any(|c| c.is_element()) {
            return Err(ParseError::NotALeaf(label.to_string()));
        }
        if unchanged(node.text().map(str::trim).unwrap_or("")) {
            return Ok(());
        }

        let escaped = escape(value);
        if let Some(text) = node.children().find(|c| c.is_text()) {
            self.push(Edit {
                range: text.range(),
                replacement: escaped,
            });
            return Ok(());
        }

        // Empty element: insert after the start tag, expanding `<a/>` if needed
        let span = node.range();
        let raw = &self.doc.input()[span.clone()];
        let end = start_tag_end(raw).ok_or_else(|| ParseError::NotALeaf(label.to_string()))?;
        let edit = if raw[..end].ends_with("/>") {
            Edit {
                range: span.start + end - 2..span.start + end,
                replacement: format!(">{escaped}</{}>", element_name(raw)),
            }
        } else {
            Edit {
                range: span.start + end..span.start + end,
                replacement: escaped,
            }
        };
        self.push(edit);
        Ok(())
    }

    /// Replaces the value of an existing attribute unless `unchanged` holds
    pub fn set_attribute(
        &mut self,
        path: &NodePath,
        attribute: &str,
        value: &str,
        unchanged: impl Fn(&str) -> bool,
    ) -> Result<(), ParseError> {
        let node = self.doc.node(path)?;
        let missing = || ParseError::MissingAttribute {
            node: path.to_string(),
            attribute: attribute.to_string(),
        };
        let current = node.attribute(attribute).ok_or_else(missing)?;
        if unchanged(current) {
            return Ok(());
        }
        let span = node.range();
        let raw = &self.doc.input()[span.clone()];
        let tag_end = start_tag_end(raw).ok_or_else(missing)?;
        let value_span = attribute_value_span(&raw[..tag_end], attribute).ok_or_else(missing)?;
        self.push(Edit {
            range: span.start + value_span.start..span.start + value_span.end,
            replacement: escape(value),
        });
        Ok(())
    }

    /// Splices every edit into a copy of the original text
    pub fn apply(mut self) -> String {
        self.edits.sort_by_key(|e| (e.range.start, e.range.end));
        let input = self.doc.input();
        let extra: usize = self.edits.iter().map(|e| e.replacement.len()).sum();
        let mut output = String::with_capacity(input.len() + extra);
        let mut cursor = 0;
        for edit in &self.edits {
            output.push_str(&input[cursor..edit.range.start]);
            output.push_str(&edit.replacement);
            cursor = edit.range.end;
        }
        output.push_str(&input[cursor..]);
        output
    }
}

// ============================================================================
// Section planners
// ============================================================================

pub(crate) fn plan_store(plan: &mut EditPlan<'_, '_>, store: &ParameterStore, selector: &Selector) -> Result<()> {
    if selector.domain {
        let domain = store.domain.as_ref().ok_or_else(|| not_loaded("domain"))?;
        plan_domain(plan, domain)?;
    }
    if selector.overall {
        let overall = store.overall.as_ref().ok_or_else(|| not_loaded("overall"))?;
        plan_overall(plan, overall)?;
    }
    if selector.microenvironment {
        let substances = store
            .substances
            .as_ref()
            .ok_or_else(|| not_loaded("microenvironment"))?;
        for substance in substances {
            plan_substance(plan, substance)?;
        }
    }
    match &selector.cell_types {
        CellTypeSelection::None => {}
        CellTypeSelection::All => {
            for cell in &store.cell_types {
                plan_cell_type(plan, cell)?;
            }
        }
        CellTypeSelection::Named(names) => {
            for name in names {
                let cell = store
                    .cell_type(name)
                    .ok_or_else(|| not_loaded(&format!("cell type `{name}`")))?;
                plan_cell_type(plan, cell)?;
            }
        }
    }
    if selector.user_parameters {
        let parameters = store
            .user_parameters
            .as_ref()
            .ok_or_else(|| not_loaded("user_parameters"))?;
        plan_user_entries(plan, &schema::user_parameters(), parameters)?;
    }
    Ok(())
}

fn not_loaded(section: &str) -> Error {
    Error::SectionNotLoaded(section.to_string())
}

fn plan_fields<T>(plan: &mut EditPlan<'_, '_>, base: &NodePath, fields: &[Field<T>], source: &T) -> Result<(), ParseError> {
    for (tag, get, _) in fields {
        plan.set_number(&base.child(tag), get(source))?;
    }
    Ok(())
}

fn plan_domain(plan: &mut EditPlan<'_, '_>, domain: &Domain) -> Result<(), ParseError> {
    let base = schema::domain();
    for axis in crate::params::Axis::ALL {
        let range = domain.range(axis);
        plan.set_number(&base.child(&format!("{}_min", axis.as_str())), range.min())?;
        plan.set_number(&base.child(&format!("{}_max", axis.as_str())), range.max())?;
    }
    plan.set_number(&base.child("dx"), domain.dx())?;
    plan.set_number(&base.child("dy"), domain.dy())?;
    plan.set_number(&base.child("dz"), domain.dz())?;
    plan.set_flag(&base.child("use_2D"), domain.use_2d)
}

fn plan_overall(plan: &mut EditPlan<'_, '_>, overall: &Overall) -> Result<(), ParseError> {
    plan_fields(plan, &schema::overall(), &schema::OVERALL_FIELDS, overall)
}

fn plan_substance(plan: &mut EditPlan<'_, '_>, substance: &Substance) -> Result<(), ParseError> {
    let base = schema::substance(&substance.name);
    plan_fields(
        plan,
        &base.child("physical_parameter_set"),
        &schema::PHYSICAL_FIELDS,
        substance,
    )?;
    plan.set_number(&base.child("initial_condition"), substance.initial_condition())?;

    let boundary = base.child("Dirichlet_boundary_condition");
    plan.set_number(&boundary, substance.dirichlet_value())?;
    let enabled = substance.dirichlet_enabled;
    plan.set_attribute(&boundary, "enabled", bool_text(enabled), |current| {
        parse_flag(current) == Some(enabled)
    })
}

fn plan_cell_type(plan: &mut EditPlan<'_, '_>, cell: &CellTypeParameters) -> Result<(), ParseError> {
    let phenotype = schema::phenotype(&cell.name);
    plan.doc.node(&phenotype)?;

    let cycle = phenotype.child("cycle");
    let code = cell.cycle.code;
    plan.set_attribute(&cycle, "code", &code.to_string(), |current| {
        current.trim().parse::<i32>() == Ok(code)
    })?;
    if let Some(phases) = &cell.cycle.phases {
        plan_phases(plan, &cycle, phases)?;
    }

    let death = phenotype.child("death");
    for model in &cell.death {
        plan_death_model(plan, &death, model)?;
    }

    plan_fields(plan, &phenotype.child("volume"), &schema::VOLUME_FIELDS, &cell.volume)?;

    let mechanics = phenotype.child("mechanics");
    plan_fields(plan, &mechanics, &schema::MECHANICS_FIELDS, &cell.mechanics)?;
    let options = mechanics.child("options");
    if let Some(value) = cell.mechanics.relative_equilibrium_distance() {
        plan.set_number(&options.child(schema::RELATIVE_EQUILIBRIUM), value)?;
    }
    if let Some(value) = cell.mechanics.absolute_equilibrium_distance() {
        plan.set_number(&options.child(schema::ABSOLUTE_EQUILIBRIUM), value)?;
    }

    plan_motility(plan, &phenotype.child("motility"), &cell.motility)?;

    let secretion = phenotype.child("secretion");
    for entry in &cell.secretion {
        let base = secretion.named("substrate", &entry.substrate);
        plan_fields(plan, &base, &schema::SECRETION_FIELDS, entry)?;
    }

    if !cell.custom_data.is_empty() {
        plan_user_entries(plan, &schema::custom_data(&cell.name), &cell.custom_data)?;
    }
    Ok(())
}

/// Writes a phase list entry by entry; the file must hold the same count
fn plan_phases(plan: &mut EditPlan<'_, '_>, base: &NodePath, phases: &Phases) -> Result<(), ParseError> {
    let kind = phases.kind();
    let list = base.child(kind.list_tag());
    let doc = plan.doc;
    let items: Vec<_> = doc
        .node(&list)?
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == kind.item_tag())
        .collect();
    if items.len() != phases.len() {
        return Err(ParseError::LengthMismatch {
            node: list.to_string(),
            expected: phases.len(),
            found: items.len(),
        });
    }
    let label = list.child(kind.item_tag());
    for (node, value) in items.into_iter().zip(phases.values()) {
        plan.set_node_number(node, &label, *value)?;
    }
    Ok(())
}

fn plan_death_model(plan: &mut EditPlan<'_, '_>, death: &NodePath, model: &DeathModel) -> Result<(), ParseError> {
    let base = death.named("model", &model.name);
    plan.set_number(&base.child("death_rate"), model.death_rate())?;
    if let Some(phases) = &model.phases {
        plan_phases(plan, &base, phases)?;
    }
    let parameters = base.child("parameters");
    if plan.doc.find(&parameters).is_some() {
        plan_fields(plan, &parameters, &schema::DEATH_PARAMETER_FIELDS, model)?;
    }
    Ok(())
}

fn plan_motility(plan: &mut EditPlan<'_, '_>, base: &NodePath, motility: &Motility) -> Result<(), ParseError> {
    plan_fields(plan, base, &schema::MOTILITY_FIELDS, motility)?;
    let options = base.child("options");
    plan.set_flag(&options.child("enabled"), motility.enabled)?;
    plan.set_flag(&options.child("use_2D"), motility.use_2d)?;

    let chemotaxis = options.child("chemotaxis");
    if plan.doc.find(&chemotaxis).is_some() {
        plan.set_flag(&chemotaxis.child("enabled"), motility.chemotaxis.enabled)?;
        plan.set_string(&chemotaxis.child("substrate"), &motility.chemotaxis.substrate)?;
        plan.set_number(&chemotaxis.child("direction"), motility.chemotaxis.direction)?;
    }
    Ok(())
}

fn plan_user_entries(
    plan: &mut EditPlan<'_, '_>,
    base: &NodePath,
    entries: &[UserParameter],
) -> Result<(), ParseError> {
    for entry in entries {
        let path = base.child(&entry.name);
        let doc = plan.doc;
        let node = doc.node(&path)?;
        let value = entry.value();
        if node.attribute("type").is_some() {
            plan.set_attribute(&path, "type", value.type_name(), |current| {
                current.trim() == value.type_name()
            })?;
        }
        match value {
            UserValue::Int(v) => {
                let v = *v;
                plan.replace_text(node, &path, &v.to_string(), |current| {
                    current.parse::<i64>() == Ok(v)
                })?;
            }
            UserValue::Double(v) => plan.set_node_number(node, &path, *v)?,
            UserValue::Bool(v) => {
                let v = *v;
                plan.replace_text(node, &path, bool_text(v), |current| parse_flag(current) == Some(v))?;
            }
            UserValue::Text(v) => plan.replace_text(node, &path, v, |current| current == v)?,
        }
    }
    Ok(())
}

// ============================================================================
// Text helpers
// ============================================================================

/// Text that parses back to exactly `value`: plain decimal for ordinary
/// magnitudes, scientific notation below 1e-4 and from 1e16 up
pub(crate) fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Byte offset just past the `>` closing the start tag at the front of `raw`
fn start_tag_end(raw: &str) -> Option<usize> {
    let mut quote = None;
    for (i, b) in raw.bytes().enumerate().skip(1) {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            (None, b'>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Qualified element name at the front of `raw` (which starts with `<`)
fn element_name(raw: &str) -> &str {
    let rest = &raw[1..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Byte range of `name`'s value inside a start tag, quotes excluded
fn attribute_value_span(tag: &str, name: &str) -> Option<Range<usize>> {
    let bytes = tag.as_bytes();
    let skip_space = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    let mut i = 1 + element_name(tag).len();
    loop {
        i = skip_space(i);
        if i >= bytes.len() || bytes[i] == b'>' || bytes[i] == b'/' {
            return None;
        }
        let name_start = i;
        while i < bytes.len() && bytes[i] != b'=' && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let attribute = &tag[name_start..i];
        i = skip_space(i);
        if bytes.get(i) != Some(&b'=') {
            return None;
        }
        i = skip_space(i + 1);
        let quote = *bytes.get(i)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let value_start = i + 1;
        let value_end = value_start + tag[value_start..].find(quote as char)?;
        if attribute == name {
            return Some(value_start..value_end);
        }
        i = value_end + 1;
    }
}
