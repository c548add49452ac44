//! Map canvas interaction: pointer input and the controller state machine.

mod controller;
mod pointer;

#[cfg(test)]
mod tests;

pub use controller::CanvasController;
pub use pointer::{InteractionState, Modifiers, PointerButton, PointerEvent};
