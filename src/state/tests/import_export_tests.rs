//! Export, import and reset.

use chrono::NaiveDate;

use crate::error::PlannerError;
use crate::geometry::Point;
use crate::model::{Annotation, AnnotationKind, NewParticipant, ParticipantClass};
use crate::state::{AppState, MapBackground, StateManager};
use crate::viewport::Viewport;

fn populated_manager() -> StateManager {
    let mut manager = StateManager::in_memory();
    let lead = manager
        .add_participant(
            NewParticipant::new("Yun", ParticipantClass::DpsSilkbind)
                .with_team(1)
                .leader(),
        )
        .unwrap();
    manager
        .add_participant(NewParticipant::new("Bo", ParticipantClass::Healer))
        .unwrap();
    manager
        .add_annotation(Annotation::new(
            Point::new(120.0, 340.5),
            AnnotationKind::default_player_token(lead),
        ))
        .unwrap();
    manager
        .add_annotation(Annotation::new(
            Point::new(10.0, 10.0),
            AnnotationKind::default_arrow(Point::new(300.0, 220.0)),
        ))
        .unwrap();
    manager
        .add_annotation(Annotation::new(
            Point::new(600.0, 600.0),
            AnnotationKind::default_team_token(3),
        ))
        .unwrap();
    manager.set_strategy_notes("Towers first").unwrap();
    manager.update_viewport(Viewport::new(1.5, -40.0, 12.0));
    manager
}

#[test]
fn test_import_of_export_is_identity() {
    let source = populated_manager();
    let json = source.export_json().unwrap();

    let mut target = StateManager::in_memory();
    target.import_json(&json).unwrap();
    assert_eq!(target.state(), source.state());
}

#[test]
fn test_export_is_pretty_printed() {
    let json = populated_manager().export_json().unwrap();
    assert!(json.contains('\n'));
    assert!(json.contains("\"players\""));
    assert!(json.contains("\"type\": \"playerToken\""));
}

#[test]
fn test_import_clears_history_and_selection() {
    let exported = populated_manager().export_json().unwrap();

    let mut manager = StateManager::in_memory();
    let id = manager
        .add_annotation(Annotation::new(
            Point::new(0.0, 0.0),
            AnnotationKind::default_marker(),
        ))
        .unwrap();
    manager.select(Some(id));
    assert!(manager.can_undo());

    manager.import_json(&exported).unwrap();
    assert!(!manager.can_undo());
    assert!(!manager.can_redo());
    assert!(manager.selection().is_none());
    assert!(manager.has_unsaved_changes());
}

#[test]
fn test_malformed_import_leaves_state_untouched() {
    let mut manager = populated_manager();
    let before = manager.state().clone();
    let undo_count = manager.undo_count();

    for bad in [
        "",
        "not json",
        "{\"version\": \"1.0.0\"}",
        "[1, 2, 3]",
    ] {
        let err = manager.import_json(bad).unwrap_err();
        assert!(
            matches!(
                err,
                PlannerError::Json(_)
                    | PlannerError::InvalidSnapshot { .. }
                    | PlannerError::VersionTooNew { .. }
            ),
            "{bad:?} gave {err}"
        );
    }

    assert_eq!(manager.state(), &before);
    assert_eq!(manager.undo_count(), undo_count);
}

#[test]
fn test_import_rejects_invalid_content() {
    let mut manager = StateManager::in_memory();

    let mut newer = AppState::new();
    newer.version = "3.1.0".to_string();
    assert!(manager.import_json(&newer.to_json().unwrap()).is_err());

    let mut bad_zoom = AppState::new();
    bad_zoom.map.viewport.zoom = 50.0;
    assert!(manager.import_json(&bad_zoom.to_json().unwrap()).is_err());

    let bad_color = AppState::new()
        .to_json()
        .unwrap()
        .replacen("#ef4444", "crimson", 1);
    assert!(manager.import_json(&bad_color).is_err());

    assert_eq!(manager.state().teams, AppState::new().teams);
}

#[test]
fn test_import_accepts_older_minor_version() {
    let mut older = AppState::new();
    older.version = "1.0.0-beta".to_string();
    let mut manager = StateManager::in_memory();
    manager.import_json(&older.to_json().unwrap()).unwrap();
    assert_eq!(manager.state().version, "1.0.0-beta");
}

#[test]
fn test_reset_all() {
    let mut manager = populated_manager();
    manager
        .set_background(Some(MapBackground {
            name: "map.png".to_string(),
            url: "data:image/png;base64,AAAA".to_string(),
            width: 800,
            height: 600,
        }))
        .unwrap();

    manager.reset_all();

    let state = manager.state();
    assert!(state.participants.is_empty());
    assert!(state.map.annotations.is_empty());
    assert!(state.map.background_image.is_none());
    assert!(state.strategy_notes.is_empty());
    assert_eq!(state.map.viewport, Viewport::identity());
    assert!(!manager.can_undo());
}

#[test]
fn test_export_filename() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    assert_eq!(StateManager::export_filename(date), "gvg-plan-2025-03-07.json");
    assert!(StateManager::export_filename_today().starts_with("gvg-plan-"));
}
