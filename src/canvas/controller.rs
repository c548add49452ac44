//! Pointer-driven state machine for the map canvas.

use super::{InteractionState, PointerButton, PointerEvent};
use crate::error::Result;
use crate::geometry::Point;
use crate::model::{Annotation, AnnotationKind, ToolMode, hit_test};
use crate::state::{MutationMode, StateManager};
use crate::viewport::Viewport;

/// Turns pointer events into state changes.
///
/// The controller holds only interaction state; the plan itself lives in
/// the [`StateManager`] passed to each call.
#[derive(Debug, Default)]
pub struct CanvasController {
    tool: ToolMode,
    interaction: InteractionState,
    /// Screen position of the canvas' top-left corner
    origin: Point,
}

impl CanvasController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(origin: Point) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    /// Switch tools. Any interaction in progress (such as a pending arrow
    /// start) is discarded.
    pub fn set_tool(&mut self, tool: ToolMode) {
        if tool != self.tool {
            log::debug!("Tool: {} -> {}", self.tool.name(), tool.name());
        }
        self.tool = tool;
        self.cancel();
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Update the canvas position after a layout change.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Start of the arrow being drawn, if any.
    pub fn pending_arrow_start(&self) -> Option<Point> {
        match self.interaction {
            InteractionState::DrawingArrow { start } => Some(start),
            _ => None,
        }
    }

    /// Abandon the current interaction. Changes already applied stay.
    pub fn cancel(&mut self) {
        if !self.interaction.is_idle() {
            log::debug!("Cancelled {}", self.interaction.name());
            self.interaction = InteractionState::Idle;
        }
    }

    fn to_map(&self, manager: &StateManager, screen: Point) -> Point {
        manager.viewport().screen_to_map(screen, self.origin)
    }

    pub fn pointer_down(&mut self, manager: &mut StateManager, event: PointerEvent) -> Result<()> {
        log::trace!(
            "Pointer down: tool={}, pos=({:.1}, {:.1}), button={:?}",
            self.tool.name(),
            event.position.x,
            event.position.y,
            event.button
        );

        if !event.position.is_finite() {
            log::debug!("Ignoring pointer down at a non-finite position");
            return Ok(());
        }

        if !self.interaction.is_idle() {
            log::trace!("Ignoring pointer down while {}", self.interaction.name());
            return Ok(());
        }

        if event.is_pan_gesture() {
            let anchor = manager.viewport().pan_anchor(event.position);
            self.interaction = InteractionState::Panning { anchor };
            return Ok(());
        }

        if event.button != PointerButton::Primary {
            return Ok(());
        }

        let map = self.to_map(manager, event.position);
        match self.tool {
            ToolMode::Select => self.handle_select_down(manager, map),
            ToolMode::Arrow => {
                self.interaction = InteractionState::DrawingArrow { start: map };
            }
            ToolMode::Marker => self.place(manager, map, AnnotationKind::default_marker())?,
            ToolMode::Text => self.place(manager, map, AnnotationKind::default_text())?,
            ToolMode::Area => self.place(manager, map, AnnotationKind::default_area())?,
            ToolMode::TeamToken => {
                let Some(team_id) = manager.state().teams.first().map(|t| t.id) else {
                    log::debug!("No team to place a token for");
                    return Ok(());
                };
                self.place(manager, map, AnnotationKind::default_team_token(team_id))?;
            }
            ToolMode::PlayerToken => {
                let Some(player_id) = manager.state().participants.first().map(|p| p.id.clone())
                else {
                    log::debug!("No player to place a token for");
                    return Ok(());
                };
                self.place(manager, map, AnnotationKind::default_player_token(player_id))?;
            }
        }
        Ok(())
    }

    fn handle_select_down(&mut self, manager: &mut StateManager, map: Point) {
        let hit = hit_test(&manager.state().map.annotations, map)
            .map(|ann| (ann.id.clone(), ann.position()));

        match hit {
            Some((id, position)) => {
                log::debug!("Selected element {}", id);
                manager.select(Some(id.clone()));
                self.interaction = InteractionState::Dragging {
                    id,
                    offset: map - position,
                    recorded: false,
                };
            }
            None => {
                log::trace!("No element at ({:.1}, {:.1})", map.x, map.y);
                manager.select(None);
            }
        }
    }

    fn place(&mut self, manager: &mut StateManager, map: Point, kind: AnnotationKind) -> Result<()> {
        let annotation = Annotation::new(map, kind);
        log::debug!(
            "Placing {} at ({:.1}, {:.1})",
            annotation.kind.tool().name(),
            map.x,
            map.y
        );
        let id = manager.add_annotation(annotation)?;
        manager.select(Some(id));
        Ok(())
    }

    pub fn pointer_move(&mut self, manager: &mut StateManager, event: PointerEvent) -> Result<()> {
        if !event.position.is_finite() {
            log::debug!("Ignoring pointer move to a non-finite position");
            return Ok(());
        }

        match &mut self.interaction {
            InteractionState::Idle | InteractionState::DrawingArrow { .. } => {}
            InteractionState::Panning { anchor } => {
                let viewport = manager.viewport().pan_to(event.position, *anchor);
                manager.update_viewport(viewport);
            }
            InteractionState::Dragging {
                id,
                offset,
                recorded,
            } => {
                let map = manager.viewport().screen_to_map(event.position, self.origin);
                // Only the first effective step of a drag is an undo entry.
                let mode = if *recorded {
                    MutationMode::Transient
                } else {
                    MutationMode::Record
                };
                match manager.move_annotation(id, map - *offset, mode) {
                    Ok(changed) => *recorded |= changed,
                    Err(e) => {
                        self.interaction = InteractionState::Idle;
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    /// Finish the current gesture. A release at a non-finite position ends
    /// it without creating anything.
    pub fn pointer_up(&mut self, manager: &mut StateManager, event: PointerEvent) -> Result<()> {
        if !event.position.is_finite() {
            log::debug!("Pointer released at a non-finite position");
            self.cancel();
            return Ok(());
        }

        let finished = std::mem::take(&mut self.interaction);
        match finished {
            InteractionState::Idle => {}
            InteractionState::Panning { .. } => {
                log::trace!("Pan finished at {:?}", manager.viewport());
            }
            InteractionState::Dragging { id, recorded, .. } => {
                if recorded {
                    log::debug!("Finished dragging element {}", id);
                }
            }
            InteractionState::DrawingArrow { start } => {
                let end = self.to_map(manager, event.position);
                let arrow = Annotation::new(start, AnnotationKind::default_arrow(end));
                log::debug!(
                    "Arrow ({:.1}, {:.1}) -> ({:.1}, {:.1})",
                    start.x,
                    start.y,
                    end.x,
                    end.y
                );
                let id = manager.add_annotation(arrow)?;
                manager.select(Some(id));
            }
        }
        Ok(())
    }

    /// Zoom from a wheel event. Positive `delta_y` zooms out.
    pub fn wheel(&mut self, manager: &mut StateManager, delta_y: f32) {
        if !delta_y.is_finite() {
            return;
        }
        manager.update_viewport(manager.viewport().wheel(delta_y));
    }

    pub fn zoom_in(&mut self, manager: &mut StateManager) {
        manager.update_viewport(manager.viewport().zoom_in());
    }

    pub fn zoom_out(&mut self, manager: &mut StateManager) {
        manager.update_viewport(manager.viewport().zoom_out());
    }

    /// Zoom 1, no pan.
    pub fn reset_view(&mut self, manager: &mut StateManager) {
        manager.update_viewport(Viewport::identity());
    }

    /// Undo through the controller so a gesture in progress does not keep
    /// editing the restored state.
    pub fn undo(&mut self, manager: &mut StateManager) -> bool {
        self.cancel();
        manager.undo()
    }

    pub fn redo(&mut self, manager: &mut StateManager) -> bool {
        self.cancel();
        manager.redo()
    }

    /// Remove the selected annotation. Returns false if nothing was selected.
    pub fn delete_selected(&mut self, manager: &mut StateManager) -> Result<bool> {
        let Some(id) = manager.selection().cloned() else {
            return Ok(false);
        };
        if matches!(&self.interaction, InteractionState::Dragging { id: dragged, .. } if *dragged == id)
        {
            self.interaction = InteractionState::Idle;
        }
        manager.remove_annotation(&id)?;
        log::debug!("Deleted element {}", id);
        Ok(true)
    }
}
