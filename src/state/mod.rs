//! Application state, snapshot history and the state owner.

mod app_state;
mod manager;
mod undo;

#[cfg(test)]
mod tests;

pub use app_state::{AppState, MapBackground, MapData};
pub use manager::{MutationMode, StateManager};
pub use undo::UndoStack;
