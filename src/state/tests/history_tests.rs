//! Undo/redo behavior of the state manager.

use crate::constants::HISTORY_LIMIT;
use crate::error::PlannerError;
use crate::geometry::Point;
use crate::model::{Annotation, AnnotationKind, Color};
use crate::state::{MutationMode, StateManager};
use crate::viewport::Viewport;

fn marker_at(x: f32, y: f32) -> Annotation {
    Annotation::new(Point::new(x, y), AnnotationKind::default_marker())
}

#[test]
fn test_undo_redo_are_inverses() {
    let mut manager = StateManager::in_memory();
    let initial = manager.state().clone();

    manager.add_annotation(marker_at(10.0, 10.0)).unwrap();
    manager.set_strategy_notes("Hold mid").unwrap();
    let after = manager.state().clone();

    assert!(manager.undo());
    assert!(manager.undo());
    assert_eq!(manager.state(), &initial);

    assert!(manager.redo());
    assert!(manager.redo());
    assert_eq!(manager.state(), &after);
}

#[test]
fn test_undo_redo_on_empty_history_are_noops() {
    let mut manager = StateManager::in_memory();
    let initial = manager.state().clone();

    assert!(!manager.undo());
    assert!(!manager.redo());
    assert_eq!(manager.state(), &initial);
    assert!(!manager.has_unsaved_changes());
}

#[test]
fn test_new_mutation_clears_redo() {
    let mut manager = StateManager::in_memory();
    manager.add_annotation(marker_at(0.0, 0.0)).unwrap();
    manager.undo();
    assert!(manager.can_redo());

    manager.add_annotation(marker_at(5.0, 5.0)).unwrap();
    assert!(!manager.can_redo());
    assert!(!manager.redo());
}

#[test]
fn test_failed_mutation_changes_nothing() {
    let mut manager = StateManager::in_memory();
    manager.add_annotation(marker_at(0.0, 0.0)).unwrap();
    let before = manager.state().clone();
    let undo_count = manager.undo_count();

    let result = manager.mutate(MutationMode::Record, |state| {
        state.strategy_notes = "half applied".to_string();
        Err(PlannerError::invalid_snapshot("boom"))
    });

    assert!(result.is_err());
    assert_eq!(manager.state(), &before);
    assert_eq!(manager.undo_count(), undo_count);
}

#[test]
fn test_unchanged_mutation_records_nothing() {
    let mut manager = StateManager::in_memory();
    manager.clear_annotations().unwrap();
    manager.set_strategy_notes("").unwrap();
    assert_eq!(manager.undo_count(), 0);
}

#[test]
fn test_transient_mutation_skips_history() {
    let mut manager = StateManager::in_memory();
    let id = manager.add_annotation(marker_at(0.0, 0.0)).unwrap();
    assert_eq!(manager.undo_count(), 1);

    manager
        .move_annotation(&id, Point::new(40.0, 40.0), MutationMode::Transient)
        .unwrap();
    assert_eq!(manager.undo_count(), 1);
    assert_eq!(
        manager.state().annotation(&id).unwrap().position(),
        Point::new(40.0, 40.0)
    );
}

#[test]
fn test_history_is_bounded() {
    let mut manager = StateManager::in_memory();
    for i in 0..(HISTORY_LIMIT + 25) {
        manager.set_strategy_notes(format!("note {i}")).unwrap();
    }
    assert_eq!(manager.undo_count(), HISTORY_LIMIT);

    while manager.undo() {}
    // The oldest 25 entries were evicted, so the default notes are unreachable
    assert_eq!(manager.state().strategy_notes, "note 24");
}

#[test]
fn test_viewport_is_not_historized() {
    let mut manager = StateManager::in_memory();
    manager.add_annotation(marker_at(0.0, 0.0)).unwrap();
    manager.update_viewport(Viewport::new(2.0, 30.0, 40.0));
    assert_eq!(manager.undo_count(), 1);

    manager.undo();
    assert_eq!(manager.viewport(), Viewport::new(2.0, 30.0, 40.0));
    assert!(manager.state().map.annotations.is_empty());

    manager.update_viewport(Viewport::identity());
    manager.redo();
    assert_eq!(manager.viewport(), Viewport::identity());
    assert_eq!(manager.state().map.annotations.len(), 1);
}

#[test]
fn test_undo_clears_dangling_selection() {
    let mut manager = StateManager::in_memory();
    let id = manager.add_annotation(marker_at(0.0, 0.0)).unwrap();
    manager.select(Some(id.clone()));
    assert_eq!(manager.selection(), Some(&id));

    manager.undo();
    assert_eq!(manager.selection(), None);

    manager.redo();
    assert_eq!(manager.selection(), None);
}

#[test]
fn test_selecting_missing_annotation_clears_selection() {
    let mut manager = StateManager::in_memory();
    manager.select(Some("nope".into()));
    assert!(manager.selection().is_none());
}

#[test]
fn test_update_annotation_is_one_step() {
    let mut manager = StateManager::in_memory();
    let id = manager.add_annotation(marker_at(0.0, 0.0)).unwrap();

    manager
        .update_annotation(&id, |kind| {
            if let AnnotationKind::Marker { label, color, .. } = kind {
                *label = "Boss".to_string();
                *color = Color::AMBER;
            }
        })
        .unwrap();
    assert_eq!(manager.undo_count(), 2);

    manager.undo();
    match &manager.state().annotation(&id).unwrap().kind {
        AnnotationKind::Marker { label, .. } => assert_eq!(label, "Marker"),
        other => panic!("Expected marker, got {other:?}"),
    }
}

#[test]
fn test_remove_annotation() {
    let mut manager = StateManager::in_memory();
    let keep = manager.add_annotation(marker_at(0.0, 0.0)).unwrap();
    let gone = manager.add_annotation(marker_at(50.0, 0.0)).unwrap();
    manager.select(Some(gone.clone()));

    manager.remove_annotation(&gone).unwrap();
    assert!(manager.state().annotation(&gone).is_none());
    assert!(manager.state().annotation(&keep).is_some());
    assert!(manager.selection().is_none());

    let err = manager.remove_annotation(&gone).unwrap_err();
    assert!(matches!(err, PlannerError::UnknownAnnotation(_)));
}

#[test]
fn test_clear_annotations_undoes_in_one_step() {
    let mut manager = StateManager::in_memory();
    for i in 0..3 {
        manager.add_annotation(marker_at(i as f32 * 40.0, 0.0)).unwrap();
    }
    manager.clear_annotations().unwrap();
    assert!(manager.state().map.annotations.is_empty());

    manager.undo();
    assert_eq!(manager.state().map.annotations.len(), 3);
}

#[test]
fn test_non_finite_geometry_is_rejected() {
    let mut manager = StateManager::in_memory();
    let id = manager.add_annotation(marker_at(10.0, 10.0)).unwrap();
    let before = manager.state().clone();

    let err = manager.add_annotation(marker_at(f32::NAN, 1.0)).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidSnapshot { .. }));
    let err = manager
        .move_annotation(&id, Point::new(5.0, f32::INFINITY), MutationMode::Transient)
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidSnapshot { .. }));

    assert_eq!(manager.state(), &before);
    assert_eq!(manager.undo_count(), 1);

    // A NaN left behind would make every later comparison unequal
    manager.set_strategy_notes("").unwrap();
    assert_eq!(manager.undo_count(), 1);
    let json = manager.export_json().unwrap();
    manager.import_json(&json).unwrap();
    assert_eq!(manager.state(), &before);
}

#[test]
fn test_invalid_viewport_is_dropped() {
    let mut manager = StateManager::in_memory();
    let good = Viewport::new(2.0, 10.0, 10.0);
    manager.update_viewport(good);

    manager.update_viewport(Viewport {
        zoom: 1.0,
        pan_x: f32::NAN,
        pan_y: 0.0,
    });
    assert_eq!(manager.viewport(), good);
}

#[test]
fn test_patch_annotation_merges_fields() {
    let mut manager = StateManager::in_memory();
    let id = manager.add_annotation(marker_at(0.0, 0.0)).unwrap();

    manager
        .patch_annotation(&id, &serde_json::json!({"label": "Boss", "color": "#fbbf24"}))
        .unwrap();
    match &manager.state().annotation(&id).unwrap().kind {
        AnnotationKind::Marker { label, color, icon, .. } => {
            assert_eq!(label, "Boss");
            assert_eq!(*color, Color::AMBER);
            assert_eq!(icon, "flag");
        }
        other => panic!("Expected marker, got {other:?}"),
    }
    assert_eq!(manager.undo_count(), 2);

    manager.undo();
    match &manager.state().annotation(&id).unwrap().kind {
        AnnotationKind::Marker { label, .. } => assert_eq!(label, "Marker"),
        other => panic!("Expected marker, got {other:?}"),
    }
}

#[test]
fn test_patch_annotation_rejects_bad_input() {
    let mut manager = StateManager::in_memory();
    let id = manager.add_annotation(marker_at(0.0, 0.0)).unwrap();
    let before = manager.state().clone();

    for patch in [
        serde_json::json!({"id": "other"}),
        serde_json::json!({"type": "text"}),
        serde_json::json!({"size": "huge"}),
        serde_json::json!(["label"]),
    ] {
        let err = manager.patch_annotation(&id, &patch).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidPatch { .. }), "{patch}");
    }

    let err = manager
        .patch_annotation(&"missing".into(), &serde_json::json!({"label": "x"}))
        .unwrap_err();
    assert!(matches!(err, PlannerError::UnknownAnnotation(_)));

    assert_eq!(manager.state(), &before);
    assert_eq!(manager.undo_count(), 1);
}
