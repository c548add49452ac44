//! Selection and dragging in Select mode.

use crate::canvas::{CanvasController, InteractionState, PointerEvent};
use crate::geometry::Point;
use crate::model::{Annotation, AnnotationKind, ToolMode};
use crate::state::StateManager;
use crate::viewport::Viewport;

fn setup() -> (StateManager, CanvasController) {
    (StateManager::in_memory(), CanvasController::new())
}

fn add_marker(manager: &mut StateManager, x: f32, y: f32) -> crate::model::AnnotationId {
    manager
        .add_annotation(Annotation::new(
            Point::new(x, y),
            AnnotationKind::default_marker(),
        ))
        .unwrap()
}

#[test]
fn test_create_drag_undo_undo() {
    let (mut manager, mut canvas) = setup();

    canvas.set_tool(ToolMode::Marker);
    canvas
        .pointer_down(&mut manager, PointerEvent::primary(100.0, 100.0))
        .unwrap();
    canvas
        .pointer_up(&mut manager, PointerEvent::primary(100.0, 100.0))
        .unwrap();
    assert_eq!(manager.state().map.annotations.len(), 1);
    let id = manager.state().map.annotations[0].id.clone();
    assert_eq!(manager.selection(), Some(&id));

    canvas.set_tool(ToolMode::Select);
    canvas
        .pointer_down(&mut manager, PointerEvent::primary(105.0, 100.0))
        .unwrap();
    for step in 1..=10 {
        let x = 105.0 + step as f32 * 9.5;
        canvas
            .pointer_move(&mut manager, PointerEvent::primary(x, 100.0))
            .unwrap();
    }
    canvas
        .pointer_up(&mut manager, PointerEvent::primary(200.0, 100.0))
        .unwrap();

    assert_eq!(
        manager.state().annotation(&id).unwrap().position(),
        Point::new(195.0, 100.0)
    );
    // Creation plus one entry for the whole drag
    assert_eq!(manager.undo_count(), 2);

    assert!(manager.undo());
    assert_eq!(
        manager.state().annotation(&id).unwrap().position(),
        Point::new(100.0, 100.0)
    );

    assert!(manager.undo());
    assert!(manager.state().map.annotations.is_empty());
    assert!(manager.selection().is_none());
}

#[test]
fn test_click_without_move_records_nothing() {
    let (mut manager, mut canvas) = setup();
    let id = add_marker(&mut manager, 50.0, 50.0);
    let undo_count = manager.undo_count();

    canvas
        .pointer_down(&mut manager, PointerEvent::primary(52.0, 48.0))
        .unwrap();
    assert!(matches!(
        canvas.interaction(),
        InteractionState::Dragging { .. }
    ));
    canvas
        .pointer_up(&mut manager, PointerEvent::primary(52.0, 48.0))
        .unwrap();

    assert_eq!(manager.undo_count(), undo_count);
    assert_eq!(manager.selection(), Some(&id));
    assert!(canvas.interaction().is_idle());
}

#[test]
fn test_click_on_empty_space_clears_selection() {
    let (mut manager, mut canvas) = setup();
    let id = add_marker(&mut manager, 50.0, 50.0);
    manager.select(Some(id));

    canvas
        .pointer_down(&mut manager, PointerEvent::primary(900.0, 900.0))
        .unwrap();
    assert!(manager.selection().is_none());
    assert!(canvas.interaction().is_idle());
}

#[test]
fn test_select_picks_topmost() {
    let (mut manager, mut canvas) = setup();
    add_marker(&mut manager, 50.0, 50.0);
    let top = add_marker(&mut manager, 55.0, 55.0);

    canvas
        .pointer_down(&mut manager, PointerEvent::primary(53.0, 53.0))
        .unwrap();
    assert_eq!(manager.selection(), Some(&top));
}

#[test]
fn test_drag_keeps_grab_offset_under_zoom() {
    let (mut manager, _) = setup();
    let mut canvas = CanvasController::with_origin(Point::new(10.0, 20.0));
    manager.update_viewport(Viewport::new(2.0, 100.0, 0.0));
    let id = add_marker(&mut manager, 50.0, 50.0);

    // Map (52, 50) on screen: 52 * 2 + 100 + 10, 50 * 2 + 0 + 20
    canvas
        .pointer_down(&mut manager, PointerEvent::primary(214.0, 120.0))
        .unwrap();
    canvas
        .pointer_move(&mut manager, PointerEvent::primary(234.0, 140.0))
        .unwrap();
    canvas
        .pointer_up(&mut manager, PointerEvent::primary(234.0, 140.0))
        .unwrap();

    assert_eq!(
        manager.state().annotation(&id).unwrap().position(),
        Point::new(60.0, 60.0)
    );
}

#[test]
fn test_arrow_drag_moves_start_only() {
    let (mut manager, mut canvas) = setup();
    let id = manager
        .add_annotation(Annotation::new(
            Point::new(0.0, 0.0),
            AnnotationKind::default_arrow(Point::new(100.0, 0.0)),
        ))
        .unwrap();

    canvas
        .pointer_down(&mut manager, PointerEvent::primary(50.0, 2.0))
        .unwrap();
    canvas
        .pointer_move(&mut manager, PointerEvent::primary(60.0, 12.0))
        .unwrap();
    canvas
        .pointer_up(&mut manager, PointerEvent::primary(60.0, 12.0))
        .unwrap();

    let arrow = manager.state().annotation(&id).unwrap();
    assert_eq!(arrow.position(), Point::new(10.0, 10.0));
    match arrow.kind {
        AnnotationKind::Arrow { x2, y2, .. } => assert_eq!((x2, y2), (100.0, 0.0)),
        ref other => panic!("Expected arrow, got {other:?}"),
    }
}

#[test]
fn test_drag_of_vanished_annotation_ends_interaction() {
    let (mut manager, mut canvas) = setup();
    add_marker(&mut manager, 50.0, 50.0);

    canvas
        .pointer_down(&mut manager, PointerEvent::primary(50.0, 50.0))
        .unwrap();
    manager.undo();

    assert!(
        canvas
            .pointer_move(&mut manager, PointerEvent::primary(70.0, 70.0))
            .is_err()
    );
    assert!(canvas.interaction().is_idle());
}

#[test]
fn test_delete_selected() {
    let (mut manager, mut canvas) = setup();
    let id = add_marker(&mut manager, 50.0, 50.0);

    assert!(!canvas.delete_selected(&mut manager).unwrap());

    manager.select(Some(id.clone()));
    assert!(canvas.delete_selected(&mut manager).unwrap());
    assert!(manager.state().annotation(&id).is_none());
    assert!(manager.selection().is_none());

    manager.undo();
    assert!(manager.state().annotation(&id).is_some());
}

#[test]
fn test_undo_during_drag_ends_the_drag() {
    let (mut manager, mut canvas) = setup();
    let id = add_marker(&mut manager, 100.0, 100.0);

    canvas
        .pointer_down(&mut manager, PointerEvent::primary(100.0, 100.0))
        .unwrap();
    canvas
        .pointer_move(&mut manager, PointerEvent::primary(150.0, 100.0))
        .unwrap();
    assert_eq!(manager.undo_count(), 2);

    assert!(canvas.undo(&mut manager));
    assert!(canvas.interaction().is_idle());
    assert_eq!(
        manager.state().annotation(&id).unwrap().position(),
        Point::new(100.0, 100.0)
    );

    // Further movement of the held button no longer drags
    canvas
        .pointer_move(&mut manager, PointerEvent::primary(180.0, 100.0))
        .unwrap();
    canvas
        .pointer_up(&mut manager, PointerEvent::primary(180.0, 100.0))
        .unwrap();
    assert_eq!(
        manager.state().annotation(&id).unwrap().position(),
        Point::new(100.0, 100.0)
    );
    assert!(manager.can_redo());

    assert!(canvas.redo(&mut manager));
    assert_eq!(
        manager.state().annotation(&id).unwrap().position(),
        Point::new(150.0, 100.0)
    );
}
