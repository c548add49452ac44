//! GvG Planner - roster, team and battlefield map planning
//!
//! Core of a planning tool for large guild-versus-guild events: a roster of
//! up to thirty participants split across six teams, and a battlefield map
//! with markers, labels, arrows, zones and tokens. All edits go through
//! [`StateManager`], which keeps snapshot undo/redo and debounced
//! persistence. [`CanvasController`] turns pointer input into edits and
//! [`render`] produces a drawable [`Scene`].

pub mod background;
pub mod canvas;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod model;
pub mod persist;
pub mod render;
pub mod state;
pub mod viewport;

pub use background::BackgroundCache;
pub use canvas::CanvasController;
pub use error::{PlannerError, Result};
pub use render::{Scene, render};
pub use state::{AppState, MapBackground, MutationMode, StateManager};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
