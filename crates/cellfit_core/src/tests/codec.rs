use crate::error::{Error, ParseError};
use crate::params::{Axis, Selector, UserValue};

use super::fixtures::{SETTINGS_XML, SettingsFile};

#[test]
fn reads_every_section() {
    let file = SettingsFile::new();
    let store = file.codec().read(&Selector::all()).unwrap();

    let domain = store.domain.as_ref().unwrap();
    assert_eq!(domain.range(Axis::X).min(), -500.0);
    assert_eq!(domain.range(Axis::Z).max(), 10.0);
    assert_eq!(domain.dx(), 20.0);
    assert!(domain.use_2d);

    let overall = store.overall.as_ref().unwrap();
    assert_eq!(overall.max_time(), 620.0);
    assert_eq!(overall.dt_phenotype(), 6.0);

    let oxygen = store.substance("oxygen").unwrap();
    assert_eq!(oxygen.decay_rate(), 0.1);
    assert_eq!(oxygen.dirichlet_value(), 38.0);
    assert!(oxygen.dirichlet_enabled);
    assert!(!store.substance("substrate").unwrap().dirichlet_enabled);

    assert_eq!(store.cell_types.len(), 2);
    let default = store.cell_type("default").unwrap();
    assert_eq!(default.cycle.code, 6);
    assert_eq!(
        default.cycle.phases.as_ref().unwrap().values(),
        &[300.0, 480.0, 240.0, 60.0]
    );
    assert_eq!(default.death.len(), 2);
    assert_eq!(default.death_model("necrosis").unwrap().phases.as_ref().unwrap().len(), 2);
    assert_eq!(default.motility.migration_bias(), 0.5);
    assert_eq!(default.motility.chemotaxis.substrate, "substrate");
    assert_eq!(default.mechanics.relative_equilibrium_distance(), Some(1.8));
    assert_eq!(default.secretion_for("oxygen").unwrap().uptake_rate(), 10.0);
    assert_eq!(default.custom("sample").unwrap().value(), &UserValue::Double(1.0));

    let cancer = store.cell_type("cancer").unwrap();
    assert_eq!(cancer.cycle.phases.as_ref().unwrap().values(), &[0.0072]);
    assert!(cancer.motility.enabled);
    assert!(cancer.secretion.is_empty());

    assert_eq!(store.user_parameter("random_seed").unwrap().value(), &UserValue::Int(0));
    assert_eq!(store.user_parameter("track_cells").unwrap().value(), &UserValue::Bool(true));
    assert_eq!(
        store.user_parameter("label").unwrap().value(),
        &UserValue::Text(String::new())
    );
}

#[test]
fn selector_limits_what_is_read() {
    let file = SettingsFile::new();
    let store = file
        .codec()
        .read(&Selector::new().with_cell_type("cancer"))
        .unwrap();
    assert!(store.domain.is_none());
    assert!(store.substances.is_none());
    assert!(store.user_parameters.is_none());
    assert_eq!(store.cell_types.len(), 1);
    assert_eq!(store.cell_types[0].name, "cancer");
}

#[test]
fn lists_names_in_file_order() {
    let file = SettingsFile::new();
    assert_eq!(file.codec().cell_type_names().unwrap(), vec!["default", "cancer"]);
    assert_eq!(file.codec().substance_names().unwrap(), vec!["substrate", "oxygen"]);
}

#[test]
fn unchanged_write_keeps_file_identical() {
    let file = SettingsFile::new();
    let codec = file.codec();
    let selector = Selector::all();
    let store = codec.read(&selector).unwrap();

    assert_eq!(codec.write(&store, &selector).unwrap(), 0);
    assert_eq!(file.content(), SETTINGS_XML);
}

#[test]
fn round_trip_changes_only_target_values() {
    let file = SettingsFile::new();
    let codec = file.codec();
    let selector = Selector::new().with_cell_type("default");
    let mut store = codec.read(&selector).unwrap();

    let cell = store.cell_type_mut("default").unwrap();
    cell.motility.set_speed(1.5).unwrap();
    cell.cycle.phases.as_mut().unwrap().set(2, 200.0).unwrap();

    assert_eq!(codec.write(&store, &selector).unwrap(), 2);

    let expected = SETTINGS_XML
        .replace(
            r#"<speed units="micron/min">1</speed>"#,
            r#"<speed units="micron/min">1.5</speed>"#,
        )
        .replace(
            r#"<duration index="2" fixed_duration="true">240</duration>"#,
            r#"<duration index="2" fixed_duration="true">200</duration>"#,
        );
    assert_eq!(file.content(), expected);

    let reread = codec.read(&selector).unwrap();
    assert_eq!(reread, store);
}

#[test]
fn untouched_sections_are_preserved() {
    let file = SettingsFile::new();
    let codec = file.codec();
    let selector = Selector::new().with_microenvironment();
    let mut store = codec.read(&selector).unwrap();
    let oxygen = store.substance_mut("oxygen").unwrap();
    oxygen.set_decay_rate(0.25).unwrap();
    oxygen.dirichlet_enabled = false;

    assert_eq!(codec.write(&store, &selector).unwrap(), 2);

    let content = file.content();
    assert!(content.contains(r#"<decay_rate units="1/min">0.25</decay_rate>"#));
    assert!(content.contains(r#"<Dirichlet_boundary_condition units="mmHg" enabled="false">38</Dirichlet_boundary_condition>"#));
    assert!(content.contains("<!-- settings used by the cellfit test suite -->"));
    assert!(content.contains("<folder>output</folder>"));

    // Everything outside the microenvironment is byte-identical
    let start = SETTINGS_XML.find("<cell_definitions>").unwrap();
    assert!(content.ends_with(&SETTINGS_XML[start..]));
}

#[test]
fn undefined_cell_type_leaves_file_untouched() {
    let file = SettingsFile::new();
    let codec = file.codec();
    let result = codec.read(&Selector::new().with_cell_type("macrophage"));
    assert!(matches!(result, Err(Error::Parse(ParseError::MissingNode(_)))));
    assert_eq!(file.content(), SETTINGS_XML);
}

#[test]
fn failed_write_is_not_partial() {
    let file = SettingsFile::new();
    let codec = file.codec();
    let selector = Selector::new().with_cell_type("default");
    let mut store = codec.read(&selector).unwrap();

    let cell = store.cell_type_mut("default").unwrap();
    cell.motility.set_speed(3.0).unwrap();
    // One phase too many: the whole write must be rejected
    let mut values = cell.cycle.phases.as_ref().unwrap().values().to_vec();
    values.push(10.0);
    cell.cycle.phases = Some(crate::params::Phases::new(crate::params::PhaseKind::Durations, values).unwrap());

    let result = codec.write(&store, &selector);
    assert!(matches!(
        result,
        Err(Error::Parse(ParseError::LengthMismatch {
            expected: 5,
            found: 4,
            ..
        }))
    ));
    assert_eq!(file.content(), SETTINGS_XML);
}

#[test]
fn writing_unloaded_section_is_rejected() {
    let file = SettingsFile::new();
    let codec = file.codec();
    let store = codec.read(&Selector::new().with_domain()).unwrap();
    let result = codec.write(&store, &Selector::new().with_overall());
    assert!(matches!(result, Err(Error::SectionNotLoaded(_))));
}

#[test]
fn self_closing_string_parameter_is_expanded() {
    let file = SettingsFile::new();
    let codec = file.codec();
    let selector = Selector::new().with_user_parameters();
    let mut store = codec.read(&selector).unwrap();
    store
        .user_parameter_mut("label")
        .unwrap()
        .set_value(UserValue::Text("a<b".into()))
        .unwrap();

    assert_eq!(codec.write(&store, &selector).unwrap(), 1);
    assert!(file
        .content()
        .contains(r#"<label type="string" units="none">a&lt;b</label>"#));

    let reread = codec.read(&selector).unwrap();
    assert_eq!(
        reread.user_parameter("label").unwrap().value(),
        &UserValue::Text("a<b".into())
    );
}

#[test]
fn changing_user_parameter_type_updates_attribute() {
    let file = SettingsFile::new();
    let codec = file.codec();
    let selector = Selector::new().with_user_parameters();
    let mut store = codec.read(&selector).unwrap();
    store
        .user_parameter_mut("number_of_cells")
        .unwrap()
        .set_value(UserValue::Double(2.5))
        .unwrap();

    codec.write(&store, &selector).unwrap();
    assert!(file
        .content()
        .contains(r#"<number_of_cells type="double" units="none">2.5</number_of_cells>"#));
}

#[test]
fn missing_file_reports_path() {
    let file = SettingsFile::new();
    let codec = crate::codec::ConfigCodec::new(file.root().join("missing.xml"));
    match codec.read(&Selector::all()) {
        Err(Error::Io { path, .. }) => assert!(path.ends_with("missing.xml")),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn malformed_document_is_a_parse_error() {
    let file = SettingsFile::with_content("<PhysiCell_settings><domain></PhysiCell_settings>");
    let result = file.codec().read(&Selector::new().with_domain());
    assert!(matches!(result, Err(Error::Parse(ParseError::Malformed { .. }))));
}
