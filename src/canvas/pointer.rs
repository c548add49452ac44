//! Pointer input and the interaction state of the canvas.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::model::AnnotationId;

/// Mouse/pen button that triggered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// A pointer event in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(position: Point, button: PointerButton, modifiers: Modifiers) -> Self {
        Self {
            position,
            button,
            modifiers,
        }
    }

    /// Plain primary-button event at `(x, y)`.
    pub fn primary(x: f32, y: f32) -> Self {
        Self::new(Point::new(x, y), PointerButton::Primary, Modifiers::default())
    }

    /// Middle-button event at `(x, y)`.
    pub fn middle(x: f32, y: f32) -> Self {
        Self::new(Point::new(x, y), PointerButton::Middle, Modifiers::default())
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    /// Middle button, or primary button with Shift held, starts a pan.
    pub fn is_pan_gesture(&self) -> bool {
        match self.button {
            PointerButton::Middle => true,
            PointerButton::Primary => self.modifiers.shift,
            PointerButton::Secondary => false,
        }
    }
}

/// What the pointer is currently doing on the canvas.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Panning the view. `anchor` is the pointer minus the pan at the start.
    Panning { anchor: Point },
    /// Dragging an annotation. `offset` is pointer minus anchor in map space;
    /// `recorded` is set once the drag has produced its undo entry.
    Dragging {
        id: AnnotationId,
        offset: Point,
        recorded: bool,
    },
    /// Arrow tool pressed at `start` (map space), waiting for release.
    DrawingArrow { start: Point },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Panning { .. } => "panning",
            InteractionState::Dragging { .. } => "dragging",
            InteractionState::DrawingArrow { .. } => "drawingArrow",
        }
    }
}
