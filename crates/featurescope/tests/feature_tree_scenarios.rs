//! End-to-end scenarios over the feature tree, filter proxy and editors.
#![cfg(feature = "mock-nodes")]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;
use std::time::Duration;

use featurescope::model::{
    AccessMode, CLICK_HERE, FeatureEditController, FeatureFilterProxy, FeatureRef,
    FeatureTreeModel, FeatureValue, IntegerBounds, ItemData, ItemModel, ItemRole, MockFeature,
    ModelIndex, NOT_ACCESSIBLE, Visibility,
};
use featurescope::{FeatureError, PollingThread, ViewerConfig};

struct Scenario {
    source: Arc<FeatureTreeModel>,
    gain: Arc<MockFeature>,
}

/// Root(Category) → [Gain(Integer RW Beginner 4, 0..10), Advanced(Category Expert) → [Note(String RO Guru)]]
fn scenario() -> Scenario {
    let gain = MockFeature::integer("Gain", 4, IntegerBounds::new(0, 10, 1)).shared();
    let note: FeatureRef = MockFeature::string("Note", "factory")
        .with_access(AccessMode::ReadOnly)
        .with_visibility(Visibility::Guru)
        .shared();
    let advanced: FeatureRef = MockFeature::category("Advanced", vec![note])
        .with_visibility(Visibility::Expert)
        .shared();
    let root: FeatureRef =
        MockFeature::category("Root", vec![gain.clone() as FeatureRef, advanced]).shared();

    Scenario {
        source: Arc::new(FeatureTreeModel::new(vec![root])),
        gain,
    }
}

fn names(model: &dyn ItemModel) -> Vec<String> {
    fn walk(model: &dyn ItemModel, parent: &ModelIndex, out: &mut Vec<String>) {
        for row in 0..model.row_count(parent) {
            let index = model.index(row, 0, parent);
            out.push(model.display_text(&index).unwrap_or_default());
            walk(model, &index, out);
        }
    }
    let mut out = Vec::new();
    walk(model, &ModelIndex::invalid(), &mut out);
    out
}

fn assert_parent_child_invariant(model: &dyn ItemModel, parent: &ModelIndex) {
    for row in 0..model.row_count(parent) {
        for column in 0..model.column_count(parent) {
            let child = model.index(row, column, parent);
            assert!(child.is_valid());
            assert_eq!(model.parent(&child), *parent);
        }
        assert_parent_child_invariant(model, &model.index(row, 0, parent));
    }
}

#[test]
fn test_visibility_and_keyword_scenario() {
    let Scenario { source, .. } = scenario();
    let proxy = FeatureFilterProxy::new(source.clone());

    assert_eq!(names(&*proxy), ["Root", "Gain"]);

    proxy.set_visibility(Visibility::Guru);
    assert_eq!(names(&*proxy), ["Root", "Gain", "Advanced", "Note"]);

    proxy.set_keyword("gain");
    assert_eq!(names(&*proxy), ["Root", "Gain"]);

    assert_eq!(names(&*source), ["Root", "Gain", "Advanced", "Note"]);
}

#[test]
fn test_parent_of_child_is_parent() {
    let Scenario { source, .. } = scenario();
    assert_parent_child_invariant(&*source, &ModelIndex::invalid());

    let proxy = FeatureFilterProxy::new(source);
    for visibility in Visibility::ALL {
        proxy.set_visibility(visibility);
        assert_parent_child_invariant(&*proxy, &ModelIndex::invalid());
    }
}

#[test]
fn test_category_value_column_is_empty() {
    let Scenario { source, .. } = scenario();
    let root = source.index(0, 0, &ModelIndex::invalid());
    let advanced = source.index(1, 0, &root);

    for category in [root, advanced] {
        assert_eq!(source.cell_content(&category.sibling_column(1)), "");
        assert!(source.style_hint(&category).is_some());
    }
}

#[test]
fn test_displayed_value_round_trips() {
    let features: Vec<FeatureRef> = vec![
        MockFeature::integer("Width", 640, IntegerBounds::new(16, 4096, 16)).shared(),
        MockFeature::float("ExposureTime", 12.5).shared(),
        MockFeature::float("Gamma", 1.0).shared(),
        MockFeature::boolean("ReverseX", true).shared(),
        MockFeature::enumeration("PixelFormat", ["Mono8", "BayerRG8"], "BayerRG8").shared(),
    ];
    let model = FeatureTreeModel::new(features);

    for row in 0..model.row_count(&ModelIndex::invalid()) {
        let value = model.index(row, 1, &ModelIndex::invalid());
        let shown = model.cell_content(&value);
        model
            .commit_edit(&value, &ItemData::from(shown.clone()))
            .unwrap_or_else(|err| panic!("row {row} rejected {shown:?}: {err}"));
        assert_eq!(model.cell_content(&value), shown);
    }
}

#[test]
fn test_command_commit_follows_truthiness() {
    let start = MockFeature::command("AcquisitionStart").shared();
    let model = FeatureTreeModel::new(vec![start.clone() as FeatureRef]);
    let value = model.index(0, 1, &ModelIndex::invalid());

    assert_eq!(model.cell_content(&value), CLICK_HERE);

    model.commit_edit(&value, &ItemData::Bool(false)).unwrap();
    assert_eq!(start.execution_count(), 0);

    model.commit_edit(&value, &ItemData::Bool(true)).unwrap();
    assert_eq!(start.execution_count(), 1);
}

#[test]
fn test_write_failures_leave_value_untouched() {
    let Scenario { source, gain } = scenario();
    let root = source.index(0, 0, &ModelIndex::invalid());
    let gain_value = source.index(0, 1, &root);

    assert!(matches!(
        source.commit_edit(&gain_value, &ItemData::from("four")),
        Err(FeatureError::ParseFailure { .. })
    ));
    assert!(matches!(
        source.commit_edit(&gain_value, &ItemData::from("11")),
        Err(FeatureError::InvalidValue(_))
    ));
    assert!(!source.set_data(&gain_value, ItemData::from("-1"), ItemRole::Edit));
    assert_eq!(gain.stored_value(), Some(FeatureValue::Integer(4)));
    assert_eq!(gain.write_count(), 0);

    gain.set_access(AccessMode::NoAccess);
    assert_eq!(source.cell_content(&gain_value), NOT_ACCESSIBLE);
    assert!(!source.flags(&gain_value).enabled);
}

#[test]
fn test_editor_commit_through_filtered_view() {
    let Scenario { source, gain } = scenario();
    let proxy = FeatureFilterProxy::new(source);
    let controller = FeatureEditController::new(proxy.clone());

    let root = proxy.index(0, 0, &ModelIndex::invalid());
    let gain_value = proxy.index(0, 1, &root);

    let mut editor = controller.editor_for(&gain_value).expect("integer editor");
    assert_eq!(editor.set_integer(15), Some(10));
    controller.commit(&gain_value, &editor).unwrap();

    assert_eq!(gain.stored_value(), Some(FeatureValue::Integer(10)));
    assert_eq!(proxy.data(&gain_value, ItemRole::Display), ItemData::from("10"));
}

#[test]
fn test_config_drives_filter_and_polling() {
    let Scenario { source, gain } = scenario();
    let proxy = FeatureFilterProxy::new(source.clone());

    let config = ViewerConfig::from_toml_str(
        "visibility = \"Guru\"\nkeyword = \"note\"\n[polling]\ncadence_us = 100\nthread_name = \"scenario\"\n",
    )
    .unwrap();
    config.apply_filter(&proxy);
    assert_eq!(names(&*proxy), ["Root", "Advanced", "Note"]);

    // The worker plays the acquisition side, nudging the gain every cycle.
    let ticks = Arc::new(AtomicI64::new(0));
    let thread = PollingThread::with_config(config.polling_config().unwrap());
    assert_eq!(thread.config().name, "scenario");
    {
        let gain = gain.clone();
        let ticks = ticks.clone();
        thread.set_worker(move || {
            let tick = ticks.fetch_add(1, Ordering::SeqCst) + 1;
            gain.force_value(FeatureValue::Integer(tick % 10));
            Ok(())
        });
    }

    thread.start().unwrap();
    thread::sleep(Duration::from_millis(20));
    thread.stop().unwrap();

    let last = ticks.load(Ordering::SeqCst);
    assert!(last > 0);
    let root = source.index(0, 0, &ModelIndex::invalid());
    let gain_value = source.index(0, 1, &root);
    assert_eq!(source.cell_content(&gain_value), (last % 10).to_string());
}

#[test]
fn test_editor_commit_after_snapshot_swap_is_rejected() {
    let Scenario { source, gain } = scenario();
    let proxy = FeatureFilterProxy::new(source.clone());
    let controller = FeatureEditController::new(proxy.clone());

    let root = proxy.index(0, 0, &ModelIndex::invalid());
    let stale = proxy.index(0, 1, &root);
    let editor = controller.editor_for(&stale).expect("integer editor");

    let offset = MockFeature::integer("OffsetX", 2, IntegerBounds::new(0, 64, 2)).shared();
    let root_category: FeatureRef =
        MockFeature::category("Root", vec![offset.clone() as FeatureRef]).shared();
    source.set_features(vec![root_category]);

    assert!(!proxy.map_to_source(&stale).is_valid());
    assert!(matches!(
        controller.commit(&stale, &editor),
        Err(FeatureError::InvalidIndex)
    ));
    assert_eq!(offset.stored_value(), Some(FeatureValue::Integer(2)));
    assert_eq!(offset.write_count(), 0);
    assert_eq!(gain.write_count(), 0);
    assert_eq!(names(&*proxy), ["Root", "OffsetX"]);
}
