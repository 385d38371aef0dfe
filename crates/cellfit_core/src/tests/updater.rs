use crate::error::{Error, ResolutionError};
use crate::model::ParameterVector;
use crate::params::{CellTypeParameters, Selector, UserValue};
use crate::runner::{CellUpdater, PathUpdater, Updater};

use super::fixtures::{SETTINGS_XML, SettingsFile};

#[test]
fn path_updater_writes_every_section() {
    let file = SettingsFile::new();
    let mut updater = PathUpdater::new(file.codec(), "cancer");
    let params = ParameterVector::new()
        .with("cell/speed", 3.5)
        .with("cell/phase_0", 0.01)
        .with("me:oxygen/decay_rate", 0.2)
        .with("number_of_cells", 12.0)
        .with("track_cells", 0.0);
    updater.update(&params).unwrap();

    let store = file.codec().read(&Selector::all()).unwrap();
    let cancer = store.cell_type("cancer").unwrap();
    assert_eq!(cancer.motility.speed(), 3.5);
    assert_eq!(cancer.cycle.phases.as_ref().unwrap().values(), &[0.01]);
    assert_eq!(store.cell_type("default").unwrap().motility.speed(), 1.0);
    assert_eq!(store.substance("oxygen").unwrap().decay_rate(), 0.2);
    assert_eq!(
        store.user_parameter("number_of_cells").unwrap().value(),
        &UserValue::Int(12)
    );
    assert_eq!(
        store.user_parameter("track_cells").unwrap().value(),
        &UserValue::Bool(false)
    );
}

#[test]
fn path_updater_counts_changed_values() {
    let file = SettingsFile::new();
    let updater = PathUpdater::new(file.codec(), "cancer");

    let same = ParameterVector::new()
        .with("cell/speed", 2.0)
        .with("drift", 0.25);
    assert_eq!(updater.apply(&same).unwrap(), 0);
    assert_eq!(file.content(), SETTINGS_XML);

    let changed = ParameterVector::new()
        .with("cell/speed", 3.0)
        .with("drift", 0.25);
    assert_eq!(updater.apply(&changed).unwrap(), 1);
    assert!(file.content().contains(r#"<speed units="micron/min">3</speed>"#));
    assert_eq!(updater.apply(&ParameterVector::new()).unwrap(), 0);
}

#[test]
fn invalid_vector_leaves_file_untouched() {
    let file = SettingsFile::new();
    let mut updater = PathUpdater::new(file.codec(), "default");

    // Out of range value after a valid one
    let params = ParameterVector::new()
        .with("cell/speed", 2.0)
        .with("cell/migration_bias", 1.5);
    assert!(matches!(updater.update(&params), Err(Error::Validation(_))));
    assert_eq!(file.content(), SETTINGS_XML);

    // Unknown field is rejected before the file is read
    let params = ParameterVector::new().with("cell/wingspan", 1.0);
    assert!(matches!(
        updater.update(&params),
        Err(Error::Resolution(ResolutionError::UnknownCellField(_)))
    ));

    // Fractional value for an integer parameter
    let params = ParameterVector::new().with("random_seed", 0.5);
    assert!(matches!(updater.update(&params), Err(Error::Validation(_))));

    // Phase index past the end of the list
    let params = ParameterVector::new().with("cell/phase_7", 1.0);
    assert!(matches!(
        updater.update(&params),
        Err(Error::Resolution(ResolutionError::PhaseOutOfRange { index: 7, count: 4 }))
    ));

    assert_eq!(file.content(), SETTINGS_XML);
}

#[test]
fn empty_vector_is_a_no_op() {
    let file = SettingsFile::new();
    let mut updater = PathUpdater::new(file.codec(), "default");
    updater.update(&ParameterVector::new()).unwrap();
    assert_eq!(file.content(), SETTINGS_XML);
}

#[test]
fn cell_updater_hands_over_typed_parameters() {
    let file = SettingsFile::new();
    let mut updater = CellUpdater::new(
        file.codec(),
        "default",
        |cell: &mut CellTypeParameters, params: &ParameterVector| -> crate::Result<()> {
            let speed = params.get("speed").unwrap_or(0.0);
            cell.motility.set_speed(speed)?;
            cell.motility.set_persistence_time(speed * 2.0)?;
            cell.motility.enabled = true;
            Ok(())
        },
    );
    updater
        .update(&ParameterVector::new().with("speed", 0.75))
        .unwrap();

    let store = file
        .codec()
        .read(&Selector::new().with_cell_type("default"))
        .unwrap();
    let motility = &store.cell_type("default").unwrap().motility;
    assert_eq!(motility.speed(), 0.75);
    assert_eq!(motility.persistence_time(), 1.5);
    assert!(motility.enabled);
}
