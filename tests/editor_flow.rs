//! End-to-end flow over the library: load parameter files from disk,
//! switch the current configuration, edit and commit, absorb an external
//! correction, and save the result back out under a new name.

use scope_ui::editor::{CloseDecision, EditOutcome, EditorSession};
use scope_ui::parameter::{Parameter, ParameterKind, ParameterTree, ParameterValue};
use scope_ui::selector::{ConfigurationList, SelectorEvent};
use scope_ui::storage;
use std::path::{Path, PathBuf};

fn fixture_tree(name: &str, exposure: f64) -> ParameterTree {
    let mut tree = ParameterTree::new(name);
    tree.insert(
        "directory",
        Parameter::new("directory", ParameterKind::Directory, "/data".into())
            .with_description("Working directory"),
    );
    tree.insert(
        "setup_name",
        Parameter::new("setup_name", ParameterKind::Text, "storm1".into()).immutable(),
    );
    tree.insert(
        "camera1.exposure_time",
        Parameter::new(
            "exposure_time",
            ParameterKind::RangeFloat {
                min: 0.001,
                max: 10.0,
            },
            ParameterValue::Float(exposure),
        )
        .with_description("Seconds per frame"),
    );
    tree.insert(
        "mosaic.objective",
        Parameter::new(
            "objective",
            ParameterKind::SetString {
                allowed: vec!["obj1".into(), "obj2".into()],
            },
            "obj1".into(),
        ),
    );
    tree
}

fn write_fixture(dir: &Path, name: &str, exposure: f64) -> PathBuf {
    let path = dir.join(format!("{}.toml", name));
    storage::save_tree(&fixture_tree(name, exposure), &path).unwrap();
    path
}

#[test]
fn load_edit_commit_refresh_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let default_path = write_fixture(dir.path(), "default", 0.1);
    let stim_path = write_fixture(dir.path(), "stimulation", 0.5);

    // Load both files; the first one loaded becomes current.
    let mut list = ConfigurationList::new();
    let first = list.add(storage::load_tree(&default_path).unwrap());
    assert!(matches!(
        first,
        Some(SelectorEvent::ConfigurationChanged(_))
    ));
    assert!(list.add(storage::load_tree(&stim_path).unwrap()).is_none());

    // Switch by name, not position.
    let event = list.select_by("stimulation").unwrap();
    let Some(SelectorEvent::ConfigurationChanged(current)) = event else {
        panic!("expected a configuration change");
    };
    assert_eq!(current.display_name(), "stimulation");

    // Edit the current configuration.
    let mut session = EditorSession::new(current);
    assert_eq!(
        session
            .apply_edit("camera1.exposure_time", ParameterValue::Float(0.25))
            .unwrap(),
        EditOutcome::Modified
    );
    // Out-of-range values never reach the working copy.
    assert!(session
        .apply_edit("camera1.exposure_time", ParameterValue::Float(99.0))
        .is_err());
    assert_eq!(session.change_count(), 1);
    assert_eq!(session.close_requested(), CloseDecision::NeedsConfirmation);

    let committed = session.commit();
    assert_eq!(session.close_requested(), CloseDecision::Close);
    let index = list.index_of("stimulation").unwrap();
    list.store_committed(index, committed.clone()).unwrap();
    assert!(list.entry(index).unwrap().is_unsaved());

    // The instrument side corrects the committed tree; the open session
    // re-pulls it without generating change events.
    let mut corrected = committed;
    corrected
        .set_value("mosaic.objective", "obj2".into())
        .unwrap();
    session.refresh_from_original(&corrected);
    assert_eq!(session.change_count(), 0);
    assert_eq!(
        session.working_value("mosaic.objective"),
        Some(&"obj2".into())
    );
    list.store_committed(index, corrected).unwrap();

    // Save under a new name: the entry is renamed and marked clean.
    let saved_path = dir.path().join("night_run.toml");
    storage::save_tree(list.entry(index).unwrap().tree(), &saved_path).unwrap();
    list.mark_saved(index, storage::config_name(&saved_path))
        .unwrap();
    let entry = list.entry(index).unwrap();
    assert!(!entry.is_unsaved());
    assert_eq!(entry.name(), "night_run");

    // The saved file reflects the committed edit and the correction.
    let reloaded = storage::load_tree(&saved_path).unwrap();
    assert_eq!(reloaded.display_name(), "night_run");
    assert_eq!(
        reloaded.value("camera1.exposure_time"),
        Some(&ParameterValue::Float(0.25))
    );
    assert_eq!(reloaded.value("mosaic.objective"), Some(&"obj2".into()));
    // The immutable parameter survives untouched.
    assert_eq!(reloaded.value("setup_name"), Some(&"storm1".into()));
}

#[test]
fn capture_lock_blocks_switching_until_released() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_fixture(dir.path(), "default", 0.1);
    let b = write_fixture(dir.path(), "stimulation", 0.5);

    let mut list = ConfigurationList::new();
    list.add(storage::load_tree(&a).unwrap());
    list.add(storage::load_tree(&b).unwrap());

    list.set_locked(true);
    assert!(list.select_by("stimulation").is_err());
    assert_eq!(list.current_index(), Some(0));

    list.set_locked(false);
    assert!(list.select_by("stimulation").unwrap().is_some());
    assert_eq!(
        list.current_tree().unwrap().display_name(),
        "stimulation"
    );
}
