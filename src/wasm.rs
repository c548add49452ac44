//! Browser bindings around the planner core.
//!
//! The page forwards DOM pointer events and toolbar actions to [`Planner`]
//! and draws whatever `scene_json` returns.

use wasm_bindgen::prelude::*;

use crate::background::{BackgroundCache, decode_data_url};
use crate::canvas::{CanvasController, Modifiers, PointerButton, PointerEvent};
use crate::config::PlannerConfig;
use crate::geometry::Point;
use crate::model::{
    AnnotationId, NewParticipant, ParticipantId, ParticipantPatch, TeamId, TeamPatch, ToolMode,
};
use crate::persist::LocalStorage;
use crate::state::{MapBackground, StateManager};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = PlannerConfig::load_from_local_storage().unwrap_or_default();
    let level = config
        .preferences
        .log_level
        .to_level_filter()
        .to_level()
        .unwrap_or(log::Level::Error);
    if let Err(e) = console_log::init_with_level(level) {
        web_sys::console::log_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("{} {} starting", config.app_name, env!("CARGO_PKG_VERSION"));
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn pointer(x: f32, y: f32, button: i16, shift: bool) -> PointerEvent {
    PointerEvent::new(
        Point::new(x, y),
        PointerButton::from_dom(button),
        Modifiers {
            shift,
            ..Modifiers::default()
        },
    )
}

/// Planner session backed by `localStorage`.
#[wasm_bindgen]
pub struct Planner {
    manager: StateManager,
    canvas: CanvasController,
    background: BackgroundCache,
}

#[wasm_bindgen]
impl Planner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Planner {
        let config = PlannerConfig::load_from_local_storage().unwrap_or_default();
        let manager = StateManager::with_config(Box::new(LocalStorage::new()), &config);
        let mut background = BackgroundCache::new();
        background.sync(manager.state().map.background_image.as_ref());
        Planner {
            manager,
            canvas: CanvasController::new(),
            background,
        }
    }

    /// Screen position of the canvas element's top-left corner.
    pub fn set_origin(&mut self, x: f32, y: f32) {
        self.canvas.set_origin(Point::new(x, y));
    }

    /// Switch tool by its toolbar name; unknown names are rejected.
    pub fn set_tool(&mut self, name: &str) -> Result<(), JsValue> {
        let tool: ToolMode = name.parse().map_err(to_js)?;
        self.canvas.set_tool(tool);
        Ok(())
    }

    pub fn tool(&self) -> String {
        self.canvas.tool().name().to_string()
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, button: i16, shift: bool) -> Result<(), JsValue> {
        self.canvas
            .pointer_down(&mut self.manager, pointer(x, y, button, shift))
            .map_err(to_js)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, button: i16, shift: bool) -> Result<(), JsValue> {
        self.canvas
            .pointer_move(&mut self.manager, pointer(x, y, button, shift))
            .map_err(to_js)
    }

    pub fn pointer_up(&mut self, x: f32, y: f32, button: i16, shift: bool) -> Result<(), JsValue> {
        self.canvas
            .pointer_up(&mut self.manager, pointer(x, y, button, shift))
            .map_err(to_js)
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.canvas.wheel(&mut self.manager, delta_y);
    }

    pub fn zoom_in(&mut self) {
        self.canvas.zoom_in(&mut self.manager);
    }

    pub fn zoom_out(&mut self) {
        self.canvas.zoom_out(&mut self.manager);
    }

    pub fn reset_view(&mut self) {
        self.canvas.reset_view(&mut self.manager);
    }

    /// Escape key: drop the current gesture.
    pub fn cancel(&mut self) {
        self.canvas.cancel();
    }

    pub fn delete_selected(&mut self) -> Result<bool, JsValue> {
        self.canvas.delete_selected(&mut self.manager).map_err(to_js)
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.canvas.undo(&mut self.manager);
        self.sync_background();
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.canvas.redo(&mut self.manager);
        self.sync_background();
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.manager.can_redo()
    }

    /// Set the map background from an image data URL.
    pub fn set_background(&mut self, name: &str, data_url: &str) -> Result<(), JsValue> {
        let (width, height) = decode_data_url(data_url).map_err(to_js)?;
        self.manager
            .set_background(Some(MapBackground {
                name: name.to_string(),
                url: data_url.to_string(),
                width,
                height,
            }))
            .map_err(to_js)?;
        self.sync_background();
        Ok(())
    }

    pub fn clear_background(&mut self) -> Result<(), JsValue> {
        self.manager.set_background(None).map_err(to_js)?;
        self.sync_background();
        Ok(())
    }

    pub fn set_strategy_notes(&mut self, notes: &str) -> Result<(), JsValue> {
        self.manager.set_strategy_notes(notes).map_err(to_js)
    }

    /// Add a participant from `{"name", "class", "teamId", "notes",
    /// "isLeader"}`; only `name` is required. Returns the new id. Fails
    /// with the roster-cap message once the roster is full.
    pub fn add_participant(&mut self, json: &str) -> Result<String, JsValue> {
        let draft: NewParticipant = serde_json::from_str(json).map_err(to_js)?;
        let id = self.manager.add_participant(draft).map_err(to_js)?;
        Ok(id.to_string())
    }

    /// Apply a participant patch; `{"teamId": null}` unassigns.
    pub fn update_participant(&mut self, id: &str, json: &str) -> Result<(), JsValue> {
        let patch: ParticipantPatch = serde_json::from_str(json).map_err(to_js)?;
        self.manager
            .update_participant(&ParticipantId::from(id), patch)
            .map_err(to_js)
    }

    /// Remove a participant and their tokens.
    pub fn remove_participant(&mut self, id: &str) -> Result<(), JsValue> {
        self.canvas.cancel();
        self.manager
            .remove_participant(&ParticipantId::from(id))
            .map_err(to_js)
    }

    /// Rename or recolor a team from `{"name", "color"}`.
    pub fn update_team(&mut self, id: TeamId, json: &str) -> Result<(), JsValue> {
        let patch: TeamPatch = serde_json::from_str(json).map_err(to_js)?;
        self.manager.update_team(id, patch).map_err(to_js)
    }

    /// Merge snapshot-style fields into a map element.
    pub fn update_element(&mut self, id: &str, json: &str) -> Result<(), JsValue> {
        let patch: serde_json::Value = serde_json::from_str(json).map_err(to_js)?;
        self.manager
            .patch_annotation(&AnnotationId::from(id), &patch)
            .map_err(to_js)
    }

    pub fn remove_element(&mut self, id: &str) -> Result<(), JsValue> {
        self.canvas.cancel();
        self.manager
            .remove_annotation(&AnnotationId::from(id))
            .map_err(to_js)
    }

    pub fn clear_elements(&mut self) -> Result<(), JsValue> {
        self.canvas.cancel();
        self.manager.clear_annotations().map_err(to_js)
    }

    /// Id of the selected element, if any.
    pub fn selection(&self) -> Option<String> {
        self.manager.selection().map(|id| id.to_string())
    }

    pub fn export_json(&self) -> Result<String, JsValue> {
        self.manager.export_json().map_err(to_js)
    }

    pub fn export_filename(&self) -> String {
        StateManager::export_filename_today()
    }

    /// Replace the whole plan; history and selection are cleared.
    pub fn import_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.canvas.cancel();
        self.manager.import_json(json).map_err(to_js)?;
        self.sync_background();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.canvas.cancel();
        self.manager.reset_all();
        self.sync_background();
    }

    /// Current state snapshot as JSON, for the roster and team panels.
    pub fn state_json(&self) -> Result<String, JsValue> {
        self.manager.state().to_json_compact().map_err(to_js)
    }

    /// Drawable scene for the current frame as JSON.
    pub fn scene_json(&self) -> Result<String, JsValue> {
        let scene = crate::render(
            self.manager.state(),
            self.manager.selection(),
            &self.background,
        );
        serde_json::to_string(&scene).map_err(to_js)
    }

    /// Call once per animation frame; writes the snapshot when the debounce
    /// period has passed. Returns true if a save happened.
    pub fn tick(&mut self) -> bool {
        self.manager.tick()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.manager.has_unsaved_changes()
    }

    fn sync_background(&mut self) {
        self.background
            .sync(self.manager.state().map.background_image.as_ref());
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}
